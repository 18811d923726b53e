//! Route definitions for the `/categories` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /             -> list_categories
/// POST   /create       -> create_category (staff, multipart)
/// GET    /{id}         -> get_category
/// PUT    /{id}         -> update_category (staff, multipart)
/// DELETE /{id}         -> delete_category (staff)
/// PATCH  /{id}/lock    -> lock_category (staff)
/// PATCH  /{id}/unlock  -> unlock_category (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list_categories))
        .route("/create", post(categories::create_category))
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/{id}/lock", patch(categories::lock_category))
        .route("/{id}/unlock", patch(categories::unlock_category))
}
