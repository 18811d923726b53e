//! Liveness and readiness at `GET /health`, outside `/api`.
//!
//! The service is only ready while PostgreSQL answers; an unreachable
//! database turns the answer into a 503 so load balancers stop routing here.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub reachable: bool,
    /// Round trip of a trivial query, in milliseconds.
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    pub status: ServiceStatus,
    #[schema(value_type = String)]
    pub version: &'static str,
    pub database: DatabaseHealth,
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable", body = HealthReport),
        (status = 503, description = "Database unreachable", body = HealthReport),
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();
    let result = rentora_db::health_check(&state.pool).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (code, status) = match &result {
        Ok(()) => (StatusCode::OK, ServiceStatus::Ok),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            (StatusCode::SERVICE_UNAVAILABLE, ServiceStatus::Degraded)
        }
    };

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            reachable: result.is_ok(),
            latency_ms,
        },
    };
    (code, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
