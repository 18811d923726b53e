//! User entity model and DTOs.

use rentora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub fullname: String,
    pub phone: String,
    pub purpose: String,
    pub status: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub email: String,
    pub fullname: String,
    pub phone: String,
    pub purpose: String,
    pub status: String,
    pub role: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            fullname: user.fullname,
            phone: user.phone,
            purpose: user.purpose,
            status: user.status,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user. `purpose` falls back to the column default.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub fullname: String,
    pub phone: String,
    pub purpose: Option<String>,
}

/// Filters for the staff user listing.
#[derive(Debug, Default)]
pub struct UserSearch {
    /// Case-insensitive substring matched against email, fullname and phone.
    pub query: Option<String>,
    /// Exact status filter.
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
