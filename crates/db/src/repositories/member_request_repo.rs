//! Repository for the `member_requests` table.

use rentora_core::types::DbId;
use sqlx::PgPool;

use crate::models::member_request::{CreateMemberRequest, MemberRequest};

const COLUMNS: &str = "id, member_name, email, message, status, created_at, updated_at";

/// Provides persistence for member requests.
pub struct MemberRequestRepo;

impl MemberRequestRepo {
    /// Insert a new request with status `new`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMemberRequest,
    ) -> Result<MemberRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO member_requests (member_name, email, message)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MemberRequest>(&query)
            .bind(&input.member_name)
            .bind(&input.email)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// All requests, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<MemberRequest>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM member_requests ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, MemberRequest>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MemberRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM member_requests WHERE id = $1");
        sqlx::query_as::<_, MemberRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the processing status. Returns `None` if the request is missing.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<MemberRequest>, sqlx::Error> {
        let query =
            format!("UPDATE member_requests SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, MemberRequest>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
