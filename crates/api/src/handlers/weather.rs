//! Handler for the `/weather` proxy.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppResult, ErrorBody};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherParams {
    /// City name; the configured default city when absent.
    pub q: Option<String>,
}

/// GET /api/weather?q=<city>
///
/// Returns the upstream JSON untouched. Upstream failures become 502.
#[utoipa::path(
    get,
    path = "/api/weather",
    tag = "weather",
    params(WeatherParams),
    responses(
        (status = 200, description = "Upstream current conditions", body = serde_json::Value),
        (status = 502, body = ErrorBody),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> AppResult<Json<serde_json::Value>> {
    let data = state.weather.current(params.q.as_deref()).await?;
    Ok(Json(data))
}
