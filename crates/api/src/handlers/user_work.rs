//! Handlers for the `/user-work` resource: staff moderation of user accounts.

use axum::extract::{Path, Query, State};
use axum::Json;
use rentora_core::pagination::{clamp_limit, clamp_page, offset_for};
use rentora_core::types::DbId;
use rentora_core::users::{transition, StatusAction, UserStatus};
use rentora_db::models::user::{UserResponse, UserSearch};
use rentora_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult, ErrorBody};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /user-work`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search_query: Option<String>,
    /// Status filter. Must name a [`UserStatus`] when non-empty.
    #[param(value_type = Option<UserStatus>)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStatusResponse {
    pub message: String,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// GET /api/user-work/count
#[utoipa::path(
    get,
    path = "/api/user-work/count",
    tag = "user work",
    security(("bearer" = [])),
    responses((status = 200, body = CountResponse), (status = 403, body = ErrorBody))
)]
pub async fn count_all(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    count(&state, None).await
}

/// GET /api/user-work/count/pending
#[utoipa::path(
    get,
    path = "/api/user-work/count/pending",
    tag = "user work",
    security(("bearer" = [])),
    responses((status = 200, body = CountResponse), (status = 403, body = ErrorBody))
)]
pub async fn count_pending(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    count(&state, Some(UserStatus::Pending)).await
}

/// GET /api/user-work/count/approved
#[utoipa::path(
    get,
    path = "/api/user-work/count/approved",
    tag = "user work",
    security(("bearer" = [])),
    responses((status = 200, body = CountResponse), (status = 403, body = ErrorBody))
)]
pub async fn count_approved(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    count(&state, Some(UserStatus::Approved)).await
}

/// GET /api/user-work/count/blocked
#[utoipa::path(
    get,
    path = "/api/user-work/count/blocked",
    tag = "user work",
    security(("bearer" = [])),
    responses((status = 200, body = CountResponse), (status = 403, body = ErrorBody))
)]
pub async fn count_blocked(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    count(&state, Some(UserStatus::Blocked)).await
}

async fn count(state: &AppState, status: Option<UserStatus>) -> AppResult<Json<CountResponse>> {
    let count = UserRepo::count_by_status(&state.pool, status.map(UserStatus::as_str)).await?;
    Ok(Json(CountResponse { count }))
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/user-work?page=&limit=&searchQuery=&category=
#[utoipa::path(
    get,
    path = "/api/user-work",
    tag = "user work",
    params(UserListParams),
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorBody),
        (status = 403, body = ErrorBody),
    )
)]
pub async fn list_users(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<UserListResponse>> {
    let status = params
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(str::parse::<UserStatus>)
        .transpose()?;

    let limit = clamp_limit(params.limit);
    let page = clamp_page(params.page);
    let search = UserSearch {
        query: params.search_query.filter(|q| !q.trim().is_empty()),
        status: status.map(|s| s.as_str().to_string()),
        limit,
        offset: offset_for(page, limit),
    };

    let users = UserRepo::search(&state.pool, &search).await?;
    let total_count = UserRepo::count_search(&state.pool, &search).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        total_count,
    }))
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// PATCH /api/user-work/{id}/approve
#[utoipa::path(
    patch,
    path = "/api/user-work/{id}/approve",
    tag = "user work",
    params(("id" = i64, Path, description = "User id")),
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserStatusResponse),
        (status = 400, description = "Transition not allowed", body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn approve_user(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserStatusResponse>> {
    let user = apply(&state, id, StatusAction::Approve, staff.user_id).await?;
    Ok(Json(UserStatusResponse {
        message: "User status updated to approved".into(),
        user,
    }))
}

/// PATCH /api/user-work/{id}/block
#[utoipa::path(
    patch,
    path = "/api/user-work/{id}/block",
    tag = "user work",
    params(("id" = i64, Path, description = "User id")),
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserStatusResponse),
        (status = 400, description = "Transition not allowed", body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn block_user(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserStatusResponse>> {
    let user = apply(&state, id, StatusAction::Block, staff.user_id).await?;
    Ok(Json(UserStatusResponse {
        message: "User status updated to blocked".into(),
        user,
    }))
}

/// PATCH /api/user-work/{id}/unblock
///
/// Only a blocked account can be unblocked; it becomes approved.
#[utoipa::path(
    patch,
    path = "/api/user-work/{id}/unblock",
    tag = "user work",
    params(("id" = i64, Path, description = "User id")),
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserStatusResponse),
        (status = 400, description = "Transition not allowed", body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn unblock_user(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserStatusResponse>> {
    let user = apply(&state, id, StatusAction::Unblock, staff.user_id).await?;
    Ok(Json(UserStatusResponse {
        message: "User unblocked (status changed to approved)".into(),
        user,
    }))
}

async fn apply(
    state: &AppState,
    id: DbId,
    action: StatusAction,
    staff_id: DbId,
) -> AppResult<UserResponse> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    let current: UserStatus = user.status.parse()?;
    let next = transition(current, action)?;

    let updated = UserRepo::set_status(&state.pool, id, next.as_str())
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(user_id = id, staff_id, status = %next, "User status changed");
    Ok(updated.into())
}
