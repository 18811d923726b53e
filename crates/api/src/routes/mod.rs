pub mod categories;
pub mod docs;
pub mod health;
pub mod member_requests;
pub mod rentals;
pub mod user;
pub mod user_work;
pub mod weather;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /user/...                 registration, login, token re-issue
/// /rentals/...              listings, rental CRUD, images
/// /rentals/renttime/...     rent time CRUD
/// /categories/...           categories with custom fields
/// /user-work/...            user moderation (staff)
/// /member-requests/...      contact requests
/// /docs/...                 legal documents
/// /weather                  weather proxy
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user::router())
        .nest("/rentals", rentals::router())
        .nest("/categories", categories::router())
        .nest("/user-work", user_work::router())
        .nest("/member-requests", member_requests::router())
        .nest("/docs", docs::router())
        .nest("/weather", weather::router())
}
