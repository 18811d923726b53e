//! Handlers for the `/docs` resource: legal documents keyed by type.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use rentora_core::documents::DocType;
use rentora_core::uploads::{extension_of, UploadKind};
use rentora_db::models::document::Document;
use rentora_db::repositories::DocumentRepo;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;
use crate::upload::read_form;

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedDocument {
    #[schema(value_type = String)]
    pub message: &'static str,
    pub doc: Document,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentWithContent {
    pub doc: Document,
    pub content: String,
}

/// Multipart body of a document upload.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct DocumentForm {
    /// One of `terms`, `privacy`, `cookie`.
    pub doc_type: String,
    #[schema(format = Binary)]
    pub file: String,
}

/// POST /api/docs
///
/// Multipart `docType` + `file`. The file is stored as `docs/<docType>.<ext>`
/// and replaces any earlier upload of the same type.
#[utoipa::path(
    post,
    path = "/api/docs",
    tag = "docs",
    request_body(content = inline(DocumentForm), content_type = "multipart/form-data"),
    security(("bearer" = [])),
    responses(
        (status = 200, body = SavedDocument),
        (status = 400, description = "Unknown type or missing file", body = ErrorBody),
    )
)]
pub async fn upload_doc(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<SavedDocument>> {
    let mut form = read_form(multipart).await?;

    let doc_type: DocType = form.text("docType").unwrap_or_default().trim().parse()?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;

    let file_name = match extension_of(&file.file_name) {
        Some(ext) => format!("{}.{ext}", doc_type.as_str()),
        None => doc_type.as_str().to_string(),
    };
    let url = state
        .files
        .save_as(UploadKind::Document, &file_name, &file.data)
        .await?;

    let (doc, previous) = DocumentRepo::upsert(&state.pool, doc_type.as_str(), &url).await?;
    if let Some(previous) = previous {
        state.files.remove(&previous).await;
    }

    tracing::info!(doc_type = doc_type.as_str(), staff_id = staff.user_id, "Document saved");

    Ok(Json(SavedDocument {
        message: "Document saved successfully",
        doc,
    }))
}

/// GET /api/docs
#[utoipa::path(
    get,
    path = "/api/docs",
    tag = "docs",
    responses((status = 200, body = Vec<Document>))
)]
pub async fn list_docs(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    Ok(Json(DocumentRepo::list(&state.pool).await?))
}

/// GET /api/docs/{docType}
#[utoipa::path(
    get,
    path = "/api/docs/{doc_type}",
    tag = "docs",
    params(("doc_type" = String, Path, description = "terms, privacy or cookie")),
    responses(
        (status = 200, body = DocumentWithContent),
        (status = 400, body = ErrorBody),
        (status = 404, description = "Nothing uploaded for this type", body = ErrorBody),
    )
)]
pub async fn get_doc(
    State(state): State<AppState>,
    Path(doc_type): Path<String>,
) -> AppResult<Json<DocumentWithContent>> {
    let doc_type: DocType = doc_type.parse()?;

    let doc = DocumentRepo::find_by_type(&state.pool, doc_type.as_str())
        .await?
        .ok_or_else(|| not_uploaded(doc_type))?;

    let content = state
        .files
        .read_text(&doc.path)
        .await?
        .ok_or_else(|| not_uploaded(doc_type))?;

    Ok(Json(DocumentWithContent { doc, content }))
}

fn not_uploaded(doc_type: DocType) -> AppError {
    AppError::NotFound(format!("No {} document has been uploaded", doc_type.as_str()))
}
