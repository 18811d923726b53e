//! Route definitions for the `/rentals` resource and its rent times.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::{rent_times, rentals};
use crate::state::AppState;

/// Routes mounted at `/rentals`.
///
/// ```text
/// GET    /                       -> list_rentals
/// POST   /                       -> create_rental (staff, multipart)
/// GET    /featured               -> list_featured
/// GET    /category/{categoryId}  -> list_by_category
/// GET    /status/{status}        -> list_by_status
/// GET    /{id}                   -> get_rental
/// PUT    /{id}                   -> update_rental (staff, multipart)
/// DELETE /{id}                   -> delete_rental (staff)
/// PATCH  /{id}/status            -> set_status (staff)
/// PATCH  /{id}/featured          -> set_featured (staff)
/// PATCH  /{id}/images/order      -> reorder_images (staff)
/// DELETE /images/{id}            -> delete_image (staff)
///
/// /renttime                      -> see rent_time_router
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rentals::list_rentals).post(rentals::create_rental))
        .route("/featured", get(rentals::list_featured))
        .route("/category/{category_id}", get(rentals::list_by_category))
        .route("/status/{status}", get(rentals::list_by_status))
        .route(
            "/{id}",
            get(rentals::get_rental)
                .put(rentals::update_rental)
                .delete(rentals::delete_rental),
        )
        .route("/{id}/status", patch(rentals::set_status))
        .route("/{id}/featured", patch(rentals::set_featured))
        .route("/{id}/images/order", patch(rentals::reorder_images))
        .route("/images/{id}", delete(rentals::delete_image))
        .nest("/renttime", rent_time_router())
}

/// Routes mounted at `/rentals/renttime`.
///
/// ```text
/// GET    /      -> list_rent_times
/// POST   /      -> create_rent_time (staff)
/// GET    /{id}  -> get_rent_time
/// PUT    /{id}  -> update_rent_time (staff)
/// DELETE /{id}  -> delete_rent_time (staff)
/// ```
pub fn rent_time_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(rent_times::list_rent_times).post(rent_times::create_rent_time),
        )
        .route(
            "/{id}",
            get(rent_times::get_rent_time)
                .put(rent_times::update_rent_time)
                .delete(rent_times::delete_rent_time),
        )
}
