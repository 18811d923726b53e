//! Route definitions for the `/member-requests` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::member_requests;
use crate::state::AppState;

/// Routes mounted at `/member-requests`.
///
/// ```text
/// POST /      -> create_request (public)
/// GET  /      -> list_requests (staff)
/// PUT  /{id}  -> update_request (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(member_requests::list_requests).post(member_requests::create_request),
        )
        .route("/{id}", put(member_requests::update_request))
}
