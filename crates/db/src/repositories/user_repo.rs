//! Repository for the `users` table.

use rentora_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User, UserSearch};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, fullname, phone, purpose, status, role, \
                        created_at, updated_at";

/// `WHERE` clause shared by [`UserRepo::search`] and [`UserRepo::count_search`].
///
/// `$1` is an optional ILIKE pattern, `$2` an optional exact status.
const SEARCH_FILTER: &str = "($1::TEXT IS NULL \
        OR email ILIKE $1 OR fullname ILIKE $1 OR phone ILIKE $1) \
     AND ($2::TEXT IS NULL OR status = $2)";

/// Provides persistence for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, fullname, phone, purpose)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'buy'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.fullname)
            .bind(&input.phone)
            .bind(&input.purpose)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by phone number.
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE phone = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Count users, optionally restricted to one status.
    pub async fn count_by_status(pool: &PgPool, status: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR status = $1)")
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// One page of users matching `search`, newest first.
    pub async fn search(pool: &PgPool, search: &UserSearch) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE {SEARCH_FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(search_pattern(search))
            .bind(&search.status)
            .bind(search.limit)
            .bind(search.offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of users matching `search`, ignoring pagination.
    pub async fn count_search(pool: &PgPool, search: &UserSearch) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM users WHERE {SEARCH_FILTER}");
        sqlx::query_scalar(&query)
            .bind(search_pattern(search))
            .bind(&search.status)
            .fetch_one(pool)
            .await
    }

    /// Set a user's status. Returns `None` if no row with the given `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Set a user's role. Roles are granted out of band; no route calls this.
    pub async fn set_role(
        pool: &PgPool,
        id: DbId,
        role: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }
}

/// ILIKE pattern for the free-text query; `%` and `_` are matched literally.
fn search_pattern(search: &UserSearch) -> Option<String> {
    let q = search.query.as_deref()?.trim();
    if q.is_empty() {
        return None;
    }
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}
