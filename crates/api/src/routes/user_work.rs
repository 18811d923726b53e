//! Route definitions for the `/user-work` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::user_work;
use crate::state::AppState;

/// Routes mounted at `/user-work`. All require staff.
///
/// ```text
/// GET   /                -> list_users
/// GET   /count           -> count_all
/// GET   /count/pending   -> count_pending
/// GET   /count/approved  -> count_approved
/// GET   /count/blocked   -> count_blocked
/// PATCH /{id}/approve    -> approve_user
/// PATCH /{id}/block      -> block_user
/// PATCH /{id}/unblock    -> unblock_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user_work::list_users))
        .route("/count", get(user_work::count_all))
        .route("/count/pending", get(user_work::count_pending))
        .route("/count/approved", get(user_work::count_approved))
        .route("/count/blocked", get(user_work::count_blocked))
        .route("/{id}/approve", patch(user_work::approve_user))
        .route("/{id}/block", patch(user_work::block_user))
        .route("/{id}/unblock", patch(user_work::unblock_user))
}
