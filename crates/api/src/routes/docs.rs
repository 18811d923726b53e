//! Route definitions for the `/docs` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::docs;
use crate::state::AppState;

/// Routes mounted at `/docs`.
///
/// ```text
/// GET  /           -> list_docs
/// POST /           -> upload_doc (staff, multipart)
/// GET  /{docType}  -> get_doc
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(docs::list_docs).post(docs::upload_doc))
        .route("/{doc_type}", get(docs::get_doc))
}
