//! Handlers for the `/categories` resource.
//!
//! Create and update take multipart forms: `name`, an `icon` file and a
//! `customFields` JSON string describing the category's field definitions.
//! Everything in the form is validated before the icon is written to disk,
//! and a freshly written icon is removed again if the database write fails.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rentora_core::custom_fields::parse_field_definitions;
use rentora_core::error::CoreError;
use rentora_core::rentals::require_text;
use rentora_core::types::DbId;
use rentora_core::uploads::{sniff_icon, UploadKind};
use rentora_db::models::category::{Category, CategoryWithFields, CreateCategory, UpdateCategory};
use rentora_db::repositories::CategoryRepo;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;
use crate::upload::{read_form, UploadedFile};

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryMessage {
    #[schema(value_type = String)]
    pub message: &'static str,
    pub category: Category,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(value_type = String)]
    pub message: &'static str,
}

/// Multipart body of category create and update. On update every part is
/// optional.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CategoryForm {
    pub name: String,
    /// PNG, JPEG, WebP, GIF or SVG.
    #[schema(format = Binary)]
    pub icon: String,
    /// JSON array of `FieldDefinitionInput`; on update, entries carrying the
    /// id of a linked definition modify it in place.
    pub custom_fields: Option<String>,
}

fn category_not_found(id: DbId) -> AppError {
    AppError::not_found("Category", id)
}

/// Validate an icon upload and write it to the icon directory.
async fn store_icon(state: &AppState, icon: &UploadedFile) -> AppResult<String> {
    let ext = sniff_icon(&icon.file_name, &icon.data)?;
    state.files.save(UploadKind::CategoryIcon, ext, &icon.data).await
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/categories/create
///
/// Inserts the category, its field definitions and their links in one
/// transaction.
#[utoipa::path(
    post,
    path = "/api/categories/create",
    tag = "categories",
    request_body(content = inline(CategoryForm), content_type = "multipart/form-data"),
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Category created", body = CategoryWithFields),
        (status = 400, description = "Missing name or icon, or invalid fields", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
    )
)]
pub async fn create_category(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = read_form(multipart).await?;

    let name = require_text("name", form.take_text("name"))?;
    let icon = form
        .take_file("icon")
        .ok_or_else(|| AppError::BadRequest("Icon is required".into()))?;
    let fields = match form.text("customFields") {
        Some(raw) => parse_field_definitions(raw)?,
        None => Vec::new(),
    };

    let icon_url = store_icon(&state, &icon).await?;

    let input = CreateCategory {
        name,
        icon: icon_url.clone(),
    };
    let created = match CategoryRepo::create_with_fields(&state.pool, &input, &fields).await {
        Ok(created) => created,
        Err(e) => {
            state.files.remove(&icon_url).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        category_id = created.category.id,
        fields = created.custom_fields.len(),
        staff_id = staff.user_id,
        "Category created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses((status = 200, body = Vec<CategoryWithFields>))
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryWithFields>>> {
    Ok(Json(CategoryRepo::list_with_fields(&state.pool).await?))
}

/// GET /api/categories/{id}
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    responses((status = 200, body = CategoryWithFields), (status = 404, body = ErrorBody))
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CategoryWithFields>> {
    CategoryRepo::find_with_fields(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| category_not_found(id))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// PUT /api/categories/{id}
///
/// All form fields are optional. A supplied `customFields` array is diffed
/// against the linked definitions by id: known ids are updated, entries
/// without an id are created, and linked definitions left out are unlinked.
/// Changing a definition that stored values would no longer fit is a 400.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    request_body(content = inline(CategoryForm), content_type = "multipart/form-data"),
    security(("bearer" = [])),
    responses(
        (status = 200, body = CategoryWithFields),
        (status = 400, description = "Invalid fields or icon", body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_category(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<CategoryWithFields>> {
    let mut form = read_form(multipart).await?;

    if CategoryRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(category_not_found(id));
    }

    let fields = form
        .text("customFields")
        .map(parse_field_definitions)
        .transpose()?;

    let icon_url = match form.take_file("icon") {
        Some(icon) => Some(store_icon(&state, &icon).await?),
        None => None,
    };

    let input = UpdateCategory {
        name: form.take_text("name"),
        icon: icon_url.clone(),
    };

    let result = CategoryRepo::update_with_diff(&state.pool, id, &input, fields).await;
    if !matches!(result, Ok(Some(_))) {
        if let Some(url) = &icon_url {
            state.files.remove(url).await;
        }
    }
    let outcome = result?.ok_or_else(|| category_not_found(id))?;

    if let Some(old_icon) = &outcome.replaced_icon {
        state.files.remove(old_icon).await;
    }

    tracing::info!(category_id = id, staff_id = staff.user_id, "Category updated");
    Ok(Json(outcome.category))
}

// ---------------------------------------------------------------------------
// Delete / lock
// ---------------------------------------------------------------------------

/// DELETE /api/categories/{id}
///
/// Rentals of the category go with it; their files and the icon are removed
/// after the transaction commits.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    security(("bearer" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody))
)]
pub async fn delete_category(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let files = CategoryRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    state.files.remove_all(&files.urls).await;

    tracing::info!(category_id = id, staff_id = staff.user_id, "Category deleted");
    Ok(Json(MessageResponse {
        message: "Category deleted successfully",
    }))
}

/// PATCH /api/categories/{id}/lock
#[utoipa::path(
    patch,
    path = "/api/categories/{id}/lock",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    security(("bearer" = [])),
    responses((status = 200, body = CategoryMessage), (status = 404, body = ErrorBody))
)]
pub async fn lock_category(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CategoryMessage>> {
    let category = set_locked(&state, id, true).await?;
    Ok(Json(CategoryMessage {
        message: "Category locked successfully",
        category,
    }))
}

/// PATCH /api/categories/{id}/unlock
#[utoipa::path(
    patch,
    path = "/api/categories/{id}/unlock",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    security(("bearer" = [])),
    responses((status = 200, body = CategoryMessage), (status = 404, body = ErrorBody))
)]
pub async fn unlock_category(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CategoryMessage>> {
    let category = set_locked(&state, id, false).await?;
    Ok(Json(CategoryMessage {
        message: "Category unlocked successfully",
        category,
    }))
}

async fn set_locked(state: &AppState, id: DbId, locked: bool) -> AppResult<Category> {
    let category = CategoryRepo::set_locked(&state.pool, id, locked)
        .await?
        .ok_or_else(|| category_not_found(id))?;
    tracing::info!(category_id = id, locked, "Category lock changed");
    Ok(category)
}

/// Rejects a write against a category id that does not exist.
pub(crate) async fn ensure_category_exists(state: &AppState, id: DbId) -> AppResult<()> {
    if CategoryRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Category {id} does not exist"
        ))));
    }
    Ok(())
}
