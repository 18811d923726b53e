//! Handlers for the `/user` resource (registration, login, token re-issue).

use axum::extract::State;
use axum::Json;
use rentora_core::error::CoreError;
use rentora_core::roles::{is_staff, ROLE_ADMIN};
use rentora_core::users::Purpose;
use rentora_db::models::user::{CreateUser, User};
use rentora_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::jwt::generate_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /user/registration`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistrationRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "Full name is too long"))]
    pub fullname: String,
    #[serde(default)]
    #[validate(length(max = 32, message = "Phone number is too long"))]
    pub phone: String,
    #[schema(value_type = Option<Purpose>)]
    pub purpose: Option<String>,
}

/// Request body for `POST /user/login` and `POST /user/adminLogin`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Every successful auth call answers with a fresh token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/user/registration
#[utoipa::path(
    post,
    path = "/api/user/registration",
    tag = "user",
    request_body = RegistrationRequest,
    responses(
        (status = 200, body = TokenResponse),
        (status = 400, description = "Invalid field, or email or phone taken", body = ErrorBody),
    )
)]
pub async fn registration(
    State(state): State<AppState>,
    Json(input): Json<RegistrationRequest>,
) -> AppResult<Json<TokenResponse>> {
    let (Some(email), Some(password)) = (
        input.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
        input.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    };

    input.validate()?;
    if input.fullname.trim().is_empty() || input.phone.trim().is_empty() {
        return Err(AppError::BadRequest("Full name and phone are required".into()));
    }
    validate_password_strength(password, MIN_PASSWORD_LENGTH).map_err(AppError::BadRequest)?;

    let purpose = input
        .purpose
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(str::parse::<Purpose>)
        .transpose()?;

    if UserRepo::find_by_email(&state.pool, email).await?.is_some() {
        return Err(AppError::BadRequest(
            "User with this email already exists".into(),
        ));
    }
    if UserRepo::find_by_phone(&state.pool, input.phone.trim())
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "User with this phone number already exists".into(),
        ));
    }

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: email.to_string(),
            password_hash,
            fullname: input.fullname.trim().to_string(),
            phone: input.phone.trim().to_string(),
            purpose: purpose.map(|p| p.as_str().to_string()),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    issue(&state, &user)
}

/// POST /api/user/login
///
/// Unknown emails and wrong passwords get the same 401.
#[utoipa::path(
    post,
    path = "/api/user/login",
    tag = "user",
    request_body = LoginRequest,
    responses((status = 200, body = TokenResponse), (status = 401, body = ErrorBody))
)]
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = authenticate(&state, &input).await?;
    issue(&state, &user)
}

/// POST /api/user/adminLogin
///
/// Same as [`login`], restricted to staff accounts.
#[utoipa::path(
    post,
    path = "/api/user/adminLogin",
    tag = "user",
    request_body = LoginRequest,
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, body = ErrorBody),
        (status = 403, description = "Not a staff account", body = ErrorBody),
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = authenticate(&state, &input).await?;
    if !is_staff(&user.role) {
        return Err(AppError::Core(CoreError::Forbidden("Access denied".into())));
    }
    tracing::info!(user_id = user.id, role = %user.role, "Staff login");
    issue(&state, &user)
}

/// GET /api/user/auth
///
/// Re-issue a token from the current database row.
#[utoipa::path(
    get,
    path = "/api/user/auth",
    tag = "user",
    security(("bearer" = [])),
    responses((status = 200, body = TokenResponse), (status = 401, body = ErrorBody))
)]
pub async fn check(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<TokenResponse>> {
    let user = current_user(&state, &auth).await?;
    issue(&state, &user)
}

/// GET /api/user/adminAuth
///
/// Like [`check`], but only for admins. The role is read from the database,
/// not from the presented token.
#[utoipa::path(
    get,
    path = "/api/user/adminAuth",
    tag = "user",
    security(("bearer" = [])),
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
    )
)]
pub async fn admin_check(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<TokenResponse>> {
    let user = current_user(&state, &auth).await?;
    if user.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden("Not the admin".into())));
    }
    issue(&state, &user)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn authenticate(state: &AppState, input: &LoginRequest) -> AppResult<User> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        ))
    };

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }
    Ok(user)
}

async fn current_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", auth.user_id))
}

fn issue(state: &AppState, user: &User) -> AppResult<Json<TokenResponse>> {
    let token = generate_token(user, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(Json(TokenResponse { token }))
}
