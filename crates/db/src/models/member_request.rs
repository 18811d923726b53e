//! Member request model.

use rentora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row from the `member_requests` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub member_name: String,
    pub email: String,
    pub message: String,
    pub status: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

/// DTO for creating a member request. Status starts at `new`.
#[derive(Debug)]
pub struct CreateMemberRequest {
    pub member_name: String,
    pub email: String,
    pub message: String,
}
