use axum::routing::get;
use axum::Router;

use crate::handlers::weather;
use crate::state::AppState;

/// Routes mounted at `/weather`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(weather::get_weather))
}
