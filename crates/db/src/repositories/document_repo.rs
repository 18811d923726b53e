//! Repository for the `documents` table.

use sqlx::PgPool;

use crate::models::document::Document;

const COLUMNS: &str = "id, doc_type, path, created_at, updated_at";

/// Provides persistence for legal documents, one per type.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert or replace the document of a type.
    ///
    /// Returns the stored row and the previous path when it differed.
    pub async fn upsert(
        pool: &PgPool,
        doc_type: &str,
        path: &str,
    ) -> Result<(Document, Option<String>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<String> =
            sqlx::query_scalar("SELECT path FROM documents WHERE doc_type = $1 FOR UPDATE")
                .bind(doc_type)
                .fetch_optional(&mut *tx)
                .await?;

        let query = format!(
            "INSERT INTO documents (doc_type, path) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_documents_doc_type \
             DO UPDATE SET path = EXCLUDED.path \
             RETURNING {COLUMNS}"
        );
        let doc = sqlx::query_as::<_, Document>(&query)
            .bind(doc_type)
            .bind(path)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((doc, previous.filter(|p| p != path)))
    }

    pub async fn find_by_type(
        pool: &PgPool,
        doc_type: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE doc_type = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(doc_type)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents ORDER BY doc_type");
        sqlx::query_as::<_, Document>(&query).fetch_all(pool).await
    }
}
