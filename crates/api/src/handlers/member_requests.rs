//! Handlers for the `/member-requests` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rentora_core::member_requests::{validate_new_request, RequestStatus};
use rentora_core::types::DbId;
use rentora_db::models::member_request::{CreateMemberRequest, MemberRequest};
use rentora_db::repositories::MemberRequestRepo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

/// Request body for `POST /member-requests`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMemberRequest {
    #[serde(default)]
    pub member_name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Request body for `PUT /member-requests/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    #[schema(value_type = RequestStatus)]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberRequestResponse {
    #[schema(value_type = String)]
    pub message: &'static str,
    pub request: MemberRequest,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberRequestList {
    pub requests: Vec<MemberRequest>,
}

/// POST /api/member-requests
///
/// Public contact form. New requests start with status `new`.
#[utoipa::path(
    post,
    path = "/api/member-requests",
    tag = "member requests",
    request_body = NewMemberRequest,
    responses((status = 201, body = MemberRequestResponse), (status = 400, body = ErrorBody))
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(input): Json<NewMemberRequest>,
) -> AppResult<impl IntoResponse> {
    validate_new_request(&input.member_name, &input.email, &input.message)?;
    input.validate()?;

    let request = MemberRequestRepo::create(
        &state.pool,
        &CreateMemberRequest {
            member_name: input.member_name.trim().to_string(),
            email: input.email.trim().to_string(),
            message: input.message,
        },
    )
    .await?;

    tracing::info!(request_id = request.id, "Member request created");

    Ok((
        StatusCode::CREATED,
        Json(MemberRequestResponse {
            message: "Member request created successfully",
            request,
        }),
    ))
}

/// GET /api/member-requests
#[utoipa::path(
    get,
    path = "/api/member-requests",
    tag = "member requests",
    security(("bearer" = [])),
    responses((status = 200, body = MemberRequestList), (status = 403, body = ErrorBody))
)]
pub async fn list_requests(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<MemberRequestList>> {
    let requests = MemberRequestRepo::list(&state.pool).await?;
    Ok(Json(MemberRequestList { requests }))
}

/// PUT /api/member-requests/{id}
#[utoipa::path(
    put,
    path = "/api/member-requests/{id}",
    tag = "member requests",
    params(("id" = i64, Path, description = "Member request id")),
    request_body = UpdateMemberRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, body = MemberRequestResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_request(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMemberRequest>,
) -> AppResult<Json<MemberRequestResponse>> {
    let status: RequestStatus = input.status.trim().parse()?;

    let request = MemberRequestRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| AppError::not_found("MemberRequest", id))?;

    tracing::info!(
        request_id = id,
        staff_id = staff.user_id,
        status = status.as_str(),
        "Member request updated"
    );

    Ok(Json(MemberRequestResponse {
        message: "Member request updated successfully",
        request,
    }))
}
