//! Handlers for the `/rentals` resource.
//!
//! Create and update take multipart forms. Text fields carry the rental's
//! own columns, `customData` carries a JSON array of
//! `{categoriesDataId, value}` pairs, `images` (or `images[]`) may repeat,
//! and `pdf` attaches a brochure. All reads return aggregated listings.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rentora_core::custom_fields::{parse_custom_data, validate_custom_data, CustomDataEntry};
use rentora_core::error::CoreError;
use rentora_core::pagination::{clamp_limit, clamp_page, offset_for};
use rentora_core::rentals::{
    parse_flag, parse_price, require_text, upload_positions, validate_reorder, ImageOrder,
    RentalStatus,
};
use rentora_core::types::DbId;
use rentora_core::uploads::{check_pdf, sniff_image, UploadKind};
use rentora_db::models::listing::{ListingFilter, RentalListing};
use rentora_db::models::rental::{
    CreateRental, NewCustomValue, NewImage, RentalImage, RentalReplacements, UpdateRental,
};
use rentora_db::repositories::{CategoryRepo, ListingRepo, RentalRepo};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult, ErrorBody};
use crate::handlers::categories::ensure_category_exists;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;
use crate::upload::{read_form, Form, UploadedFile};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Optional `?page=&limit=` on listing endpoints. Without either, every
/// match is returned.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListingParams {
    fn window(&self) -> Option<(i64, i64)> {
        if self.page.is_none() && self.limit.is_none() {
            return None;
        }
        let limit = clamp_limit(self.limit);
        Some((limit, offset_for(clamp_page(self.page), limit)))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusInput {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeaturedInput {
    pub featured: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(value_type = String)]
    pub message: &'static str,
}

/// Multipart body of rental create and update. On update every part is
/// optional.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RentalForm {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price: f64,
    pub unit_of_numeration: String,
    pub status: Option<RentalStatus>,
    pub featured: Option<bool>,
    pub category_id: i64,
    pub rent_time_id: Option<i64>,
    /// JSON array of `{categoriesDataId, value}`.
    pub custom_data: Option<String>,
    /// Image files, one part each; order follows upload position.
    pub images: Option<Vec<String>>,
    /// PDF brochure.
    #[schema(format = Binary)]
    pub pdf: Option<String>,
}

/// Text fields of a rental form, parsed but not yet checked for presence.
#[derive(Debug, Default)]
struct RentalFields {
    name: Option<String>,
    description: Option<String>,
    address: Option<String>,
    price: Option<f64>,
    unit_of_numeration: Option<String>,
    status: Option<RentalStatus>,
    featured: Option<bool>,
    category_id: Option<DbId>,
    rent_time_id: Option<DbId>,
    custom_data: Option<Vec<CustomDataEntry>>,
}

impl RentalFields {
    fn from_form(form: &mut Form) -> AppResult<Self> {
        Ok(Self {
            price: form.text("price").map(parse_price).transpose()?,
            status: form.parse::<RentalStatus>("status")?,
            featured: form
                .text("featured")
                .map(|raw| parse_flag("featured", raw))
                .transpose()?,
            category_id: form.parse("categoryId")?,
            rent_time_id: form.parse("rentTimeId")?,
            custom_data: form.text("customData").map(parse_custom_data).transpose()?,
            name: form.take_text("name"),
            description: form.take_text("description"),
            address: form.take_text("address"),
            unit_of_numeration: form.take_text("unitOfNumeration"),
        })
    }
}

/// Files received with a rental form, checked and not yet stored.
struct RentalUploads {
    images: Option<Vec<(UploadedFile, &'static str)>>,
    pdf: Option<UploadedFile>,
}

impl RentalUploads {
    fn from_form(form: &mut Form) -> AppResult<Self> {
        let images = if form.has_files("images") {
            let files = form
                .take_files("images")
                .into_iter()
                .map(|file| sniff_image(&file.data).map(|ext| (file, ext)))
                .collect::<Result<Vec<_>, _>>()?;
            Some(files)
        } else {
            None
        };

        let pdf = form.take_file("pdf");
        if let Some(pdf) = &pdf {
            check_pdf(&pdf.data)?;
        }

        Ok(Self { images, pdf })
    }
}

/// Files written to disk for a write that has not committed yet.
#[derive(Default)]
struct StoredUploads {
    images: Option<Vec<NewImage>>,
    pdf: Option<String>,
}

impl StoredUploads {
    fn urls(&self) -> Vec<String> {
        self.images
            .iter()
            .flatten()
            .map(|img| img.image.clone())
            .chain(self.pdf.clone())
            .collect()
    }
}

/// Write checked uploads to disk. On failure everything written so far is
/// removed again.
async fn store_uploads(state: &AppState, uploads: RentalUploads) -> AppResult<StoredUploads> {
    let mut stored = StoredUploads::default();

    if let Some(images) = uploads.images {
        let mut saved = Vec::with_capacity(images.len());
        for ((file, ext), order) in images.iter().zip(upload_positions(images.len())) {
            match state.files.save(UploadKind::RentalImage, ext, &file.data).await {
                Ok(image) => saved.push(NewImage { image, order }),
                Err(e) => {
                    let urls: Vec<String> = saved.into_iter().map(|i| i.image).collect();
                    state.files.remove_all(&urls).await;
                    return Err(e);
                }
            }
        }
        stored.images = Some(saved);
    }

    if let Some(pdf) = uploads.pdf {
        match state.files.save(UploadKind::RentalPdf, "pdf", &pdf.data).await {
            Ok(url) => stored.pdf = Some(url),
            Err(e) => {
                state.files.remove_all(&stored.urls()).await;
                return Err(e);
            }
        }
    }

    Ok(stored)
}

/// Validate `customData` against the schema of `category_id`.
async fn validated_values(
    state: &AppState,
    category_id: DbId,
    entries: &[CustomDataEntry],
) -> AppResult<Vec<NewCustomValue>> {
    let schema = CategoryRepo::schema(&state.pool, category_id).await?;
    let values = validate_custom_data(&schema, entries)?;
    Ok(values
        .into_iter()
        .map(|v| NewCustomValue {
            field_definition_id: v.field_definition_id,
            value: v.value.canonical(),
        })
        .collect())
}

fn rental_not_found(id: DbId) -> AppError {
    AppError::not_found("Rental", id)
}

async fn load_listing(state: &AppState, id: DbId) -> AppResult<RentalListing> {
    ListingRepo::find(&state.pool, id)
        .await?
        .ok_or_else(|| rental_not_found(id))
}

// ---------------------------------------------------------------------------
// Create / update
// ---------------------------------------------------------------------------

/// POST /api/rentals
///
/// Required fields: `name`, `price`, `unitOfNumeration`, `categoryId`.
/// Images take their upload position as `order`.
#[utoipa::path(
    post,
    path = "/api/rentals",
    tag = "rentals",
    request_body(content = inline(RentalForm), content_type = "multipart/form-data"),
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Rental created", body = RentalListing),
        (status = 400, description = "Invalid field, custom value or file", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, description = "Unknown category", body = ErrorBody),
    )
)]
pub async fn create_rental(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = read_form(multipart).await?;
    let fields = RentalFields::from_form(&mut form)?;
    let uploads = RentalUploads::from_form(&mut form)?;

    let name = require_text("name", fields.name)?;
    let unit_of_numeration = require_text("unitOfNumeration", fields.unit_of_numeration)?;
    let price = fields
        .price
        .ok_or_else(|| CoreError::Validation("price is required".into()))?;
    let category_id = fields
        .category_id
        .ok_or_else(|| CoreError::Validation("categoryId is required".into()))?;

    ensure_category_exists(&state, category_id).await?;
    let values = match &fields.custom_data {
        Some(entries) => validated_values(&state, category_id, entries).await?,
        None => Vec::new(),
    };

    let stored = store_uploads(&state, uploads).await?;

    let input = CreateRental {
        name,
        description: fields.description,
        address: fields.address,
        price,
        unit_of_numeration,
        status: fields.status.unwrap_or_default().as_str().to_string(),
        featured: fields.featured.unwrap_or(false),
        category_id,
        rent_time_id: fields.rent_time_id,
        user_id: Some(staff.user_id),
        pdf_link: stored.pdf.clone(),
    };
    let images = stored.images.as_deref().unwrap_or_default();

    let rental = match RentalRepo::create_full(&state.pool, &input, images, &values).await {
        Ok(rental) => rental,
        Err(e) => {
            state.files.remove_all(&stored.urls()).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        rental_id = rental.id,
        category_id,
        images = images.len(),
        values = values.len(),
        user_id = staff.user_id,
        "Rental created"
    );

    let listing = load_listing(&state, rental.id).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// PUT /api/rentals/{id}
///
/// Every field is optional. `images` and `customData` replace their whole
/// set when present; `pdf` replaces the brochure. Files that are no longer
/// referenced are removed after the transaction commits.
#[utoipa::path(
    put,
    path = "/api/rentals/{id}",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental id")),
    request_body(content = inline(RentalForm), content_type = "multipart/form-data"),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Rental updated", body = RentalListing),
        (status = 400, description = "Invalid field, custom value or file", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_rental(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<RentalListing>> {
    let mut form = read_form(multipart).await?;
    let fields = RentalFields::from_form(&mut form)?;
    let uploads = RentalUploads::from_form(&mut form)?;

    let existing = RentalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| rental_not_found(id))?;

    let category_id = fields.category_id.unwrap_or(existing.category_id);
    if category_id != existing.category_id {
        ensure_category_exists(&state, category_id).await?;
    }
    let custom_values = match &fields.custom_data {
        Some(entries) => Some(validated_values(&state, category_id, entries).await?),
        None => None,
    };

    let stored = store_uploads(&state, uploads).await?;

    let input = UpdateRental {
        name: fields.name,
        description: fields.description,
        address: fields.address,
        price: fields.price,
        unit_of_numeration: fields.unit_of_numeration,
        status: fields.status.map(|s| s.as_str().to_string()),
        featured: fields.featured,
        category_id: fields.category_id,
        rent_time_id: fields.rent_time_id,
        pdf_link: stored.pdf.clone(),
    };
    let replacements = RentalReplacements {
        images: stored.images.clone(),
        custom_values,
    };

    let result = RentalRepo::update_full(&state.pool, id, &input, &replacements).await;
    if !matches!(result, Ok(Some(_))) {
        state.files.remove_all(&stored.urls()).await;
    }
    let (_, superseded) = result?.ok_or_else(|| rental_not_found(id))?;

    state.files.remove_all(&superseded.urls).await;

    tracing::info!(
        rental_id = id,
        replaced_files = superseded.urls.len(),
        user_id = staff.user_id,
        "Rental updated"
    );

    Ok(Json(load_listing(&state, id).await?))
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/rentals
#[utoipa::path(
    get,
    path = "/api/rentals",
    tag = "rentals",
    params(ListingParams),
    responses((status = 200, body = Vec<RentalListing>))
)]
pub async fn list_rentals(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<Vec<RentalListing>>> {
    list(&state, ListingFilter::All, &params).await
}

/// GET /api/rentals/featured
#[utoipa::path(
    get,
    path = "/api/rentals/featured",
    tag = "rentals",
    params(ListingParams),
    responses((status = 200, body = Vec<RentalListing>))
)]
pub async fn list_featured(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<Vec<RentalListing>>> {
    list(&state, ListingFilter::Featured, &params).await
}

/// GET /api/rentals/category/{categoryId}
#[utoipa::path(
    get,
    path = "/api/rentals/category/{category_id}",
    tag = "rentals",
    params(("category_id" = i64, Path, description = "Category id"), ListingParams),
    responses((status = 200, body = Vec<RentalListing>))
)]
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<Vec<RentalListing>>> {
    list(&state, ListingFilter::Category(category_id), &params).await
}

/// GET /api/rentals/status/{status}
#[utoipa::path(
    get,
    path = "/api/rentals/status/{status}",
    tag = "rentals",
    params(("status" = RentalStatus, Path), ListingParams),
    responses(
        (status = 200, body = Vec<RentalListing>),
        (status = 400, description = "Unknown status", body = ErrorBody),
    )
)]
pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<Vec<RentalListing>>> {
    let status: RentalStatus = status.parse()?;
    list(&state, ListingFilter::Status(status.as_str().to_string()), &params).await
}

async fn list(
    state: &AppState,
    filter: ListingFilter,
    params: &ListingParams,
) -> AppResult<Json<Vec<RentalListing>>> {
    let listings = ListingRepo::list(&state.pool, &filter, params.window()).await?;
    Ok(Json(listings))
}

/// GET /api/rentals/{id}
#[utoipa::path(
    get,
    path = "/api/rentals/{id}",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental id")),
    responses((status = 200, body = RentalListing), (status = 404, body = ErrorBody))
)]
pub async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<RentalListing>> {
    Ok(Json(load_listing(&state, id).await?))
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

/// PATCH /api/rentals/{id}/status
#[utoipa::path(
    patch,
    path = "/api/rentals/{id}/status",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental id")),
    request_body = StatusInput,
    security(("bearer" = [])),
    responses(
        (status = 200, body = RentalListing),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn set_status(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusInput>,
) -> AppResult<Json<RentalListing>> {
    let status: RentalStatus = input.status.trim().parse()?;
    RentalRepo::set_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| rental_not_found(id))?;
    tracing::info!(rental_id = id, status = %status, staff_id = staff.user_id, "Rental status set");
    Ok(Json(load_listing(&state, id).await?))
}

/// PATCH /api/rentals/{id}/featured
#[utoipa::path(
    patch,
    path = "/api/rentals/{id}/featured",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental id")),
    request_body = FeaturedInput,
    security(("bearer" = [])),
    responses((status = 200, body = RentalListing), (status = 404, body = ErrorBody))
)]
pub async fn set_featured(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<FeaturedInput>,
) -> AppResult<Json<RentalListing>> {
    RentalRepo::set_featured(&state.pool, id, input.featured)
        .await?
        .ok_or_else(|| rental_not_found(id))?;
    tracing::info!(
        rental_id = id,
        featured = input.featured,
        staff_id = staff.user_id,
        "Rental featured set"
    );
    Ok(Json(load_listing(&state, id).await?))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// PATCH /api/rentals/{id}/images/order
///
/// Body: `[{id, order}]`. Every id must belong to the rental.
#[utoipa::path(
    patch,
    path = "/api/rentals/{id}/images/order",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental id")),
    request_body = Vec<ImageOrder>,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Images in their new order", body = Vec<RentalImage>),
        (status = 400, description = "Foreign, duplicate or negative entry", body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn reorder_images(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(updates): Json<Vec<ImageOrder>>,
) -> AppResult<Json<Vec<RentalImage>>> {
    if RentalRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(rental_not_found(id));
    }
    let owned = RentalRepo::image_ids(&state.pool, id).await?;
    validate_reorder(&owned, &updates)?;

    let images = RentalRepo::reorder_images(&state.pool, id, &updates).await?;
    Ok(Json(images))
}

/// DELETE /api/rentals/images/{id}
#[utoipa::path(
    delete,
    path = "/api/rentals/images/{id}",
    tag = "rentals",
    params(("id" = i64, Path, description = "Image id")),
    security(("bearer" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody))
)]
pub async fn delete_image(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(image_id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let image = RentalRepo::delete_image(&state.pool, image_id)
        .await?
        .ok_or_else(|| AppError::not_found("RentalImage", image_id))?;

    state.files.remove(&image.image).await;

    tracing::info!(image_id, rental_id = image.rental_id, "Rental image deleted");
    Ok(Json(MessageResponse {
        message: "Image deleted successfully",
    }))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/rentals/{id}
#[utoipa::path(
    delete,
    path = "/api/rentals/{id}",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental id")),
    security(("bearer" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody))
)]
pub async fn delete_rental(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let files = RentalRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| rental_not_found(id))?;

    state.files.remove_all(&files.urls).await;

    tracing::info!(rental_id = id, staff_id = staff.user_id, "Rental deleted");
    Ok(Json(MessageResponse {
        message: "Rental deleted successfully",
    }))
}
