//! Handlers for the `/rentals/renttime` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rentora_core::types::DbId;
use rentora_db::models::rent_time::RentTime;
use rentora_db::repositories::RentTimeRepo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

/// Request body for creating or renaming a rent time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RentTimeInput {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(value_type = String)]
    pub message: &'static str,
}

fn required_name(input: &RentTimeInput) -> AppResult<&str> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    Ok(name)
}

fn rent_time_not_found(id: DbId) -> AppError {
    AppError::not_found("RentTime", id)
}

/// POST /api/rentals/renttime
#[utoipa::path(
    post,
    path = "/api/rentals/renttime",
    tag = "rent times",
    request_body = RentTimeInput,
    security(("bearer" = [])),
    responses((status = 201, body = RentTime), (status = 400, body = ErrorBody))
)]
pub async fn create_rent_time(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<RentTimeInput>,
) -> AppResult<impl IntoResponse> {
    let rent_time = RentTimeRepo::create(&state.pool, required_name(&input)?).await?;
    tracing::info!(rent_time_id = rent_time.id, "Rent time created");
    Ok((StatusCode::CREATED, Json(rent_time)))
}

/// GET /api/rentals/renttime
#[utoipa::path(
    get,
    path = "/api/rentals/renttime",
    tag = "rent times",
    responses((status = 200, body = Vec<RentTime>))
)]
pub async fn list_rent_times(State(state): State<AppState>) -> AppResult<Json<Vec<RentTime>>> {
    Ok(Json(RentTimeRepo::list(&state.pool).await?))
}

/// GET /api/rentals/renttime/{id}
#[utoipa::path(
    get,
    path = "/api/rentals/renttime/{id}",
    tag = "rent times",
    params(("id" = i64, Path, description = "Rent time id")),
    responses((status = 200, body = RentTime), (status = 404, body = ErrorBody))
)]
pub async fn get_rent_time(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<RentTime>> {
    RentTimeRepo::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| rent_time_not_found(id))
}

/// PUT /api/rentals/renttime/{id}
#[utoipa::path(
    put,
    path = "/api/rentals/renttime/{id}",
    tag = "rent times",
    params(("id" = i64, Path, description = "Rent time id")),
    request_body = RentTimeInput,
    security(("bearer" = [])),
    responses(
        (status = 200, body = RentTime),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_rent_time(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RentTimeInput>,
) -> AppResult<Json<RentTime>> {
    let name = required_name(&input)?;
    RentTimeRepo::update(&state.pool, id, name)
        .await?
        .map(Json)
        .ok_or_else(|| rent_time_not_found(id))
}

/// DELETE /api/rentals/renttime/{id}
///
/// Rentals that used this rent time keep existing without one.
#[utoipa::path(
    delete,
    path = "/api/rentals/renttime/{id}",
    tag = "rent times",
    params(("id" = i64, Path, description = "Rent time id")),
    security(("bearer" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody))
)]
pub async fn delete_rent_time(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !RentTimeRepo::delete(&state.pool, id).await? {
        return Err(rent_time_not_found(id));
    }
    tracing::info!(rent_time_id = id, "Rent time deleted");
    Ok(Json(MessageResponse {
        message: "Rent time deleted successfully",
    }))
}
