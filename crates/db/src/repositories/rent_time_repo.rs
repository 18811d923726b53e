//! Repository for the `rent_times` table.

use rentora_core::types::DbId;
use sqlx::PgPool;

use crate::models::rent_time::RentTime;

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for rent times.
pub struct RentTimeRepo;

impl RentTimeRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<RentTime, sqlx::Error> {
        let query = format!("INSERT INTO rent_times (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, RentTime>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RentTime>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rent_times WHERE id = $1");
        sqlx::query_as::<_, RentTime>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<RentTime>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rent_times WHERE id = ANY($1)");
        sqlx::query_as::<_, RentTime>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<RentTime>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rent_times ORDER BY id");
        sqlx::query_as::<_, RentTime>(&query).fetch_all(pool).await
    }

    /// Rename a rent time. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<RentTime>, sqlx::Error> {
        let query = format!("UPDATE rent_times SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, RentTime>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rent time; rentals referencing it keep existing with
    /// `rent_time_id = NULL`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rent_times WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
