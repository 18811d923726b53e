//! Repository for `categories`, `field_definitions` and their
//! `category_field_links` junction.

use std::collections::HashMap;

use rentora_core::custom_fields::{
    diff_definitions, parse_value, DefinitionDiff, FieldDefinitionInput, FieldSchema,
};
use rentora_core::error::CoreError;
use rentora_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::category::{
    Category, CategoryUpdateOutcome, CategoryWithFields, CreateCategory, FieldDefinition,
    UpdateCategory,
};
use crate::models::rental::SupersededFiles;

/// Column list for the `categories` table.
const COLUMNS: &str = "id, name, icon, is_locked, created_at, updated_at";

/// Column list for the `field_definitions` table.
const FIELD_COLUMNS: &str =
    "id, name, field_type, min_size, max_size, icon, created_at, updated_at";

/// Same as [`FIELD_COLUMNS`], qualified for JOIN queries.
const FD_COLUMNS: &str = "fd.id, fd.name, fd.field_type, fd.min_size, fd.max_size, fd.icon, \
    fd.created_at, fd.updated_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// A definition row tagged with the category it was reached through.
#[derive(sqlx::FromRow)]
struct LinkedDefinition {
    category_id: DbId,
    id: DbId,
    name: String,
    field_type: String,
    min_size: i32,
    max_size: i32,
    icon: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl From<LinkedDefinition> for FieldDefinition {
    fn from(row: LinkedDefinition) -> Self {
        Self {
            id: row.id,
            name: row.name,
            field_type: row.field_type,
            min_size: row.min_size,
            max_size: row.max_size,
            icon: row.icon,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Provides persistence for categories and their custom-field schema.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a category with a fresh definition for every entry of `fields`,
    /// all in one transaction.
    ///
    /// Entry ids are ignored: creation never links existing definitions.
    pub async fn create_with_fields(
        pool: &PgPool,
        input: &CreateCategory,
        fields: &[FieldDefinitionInput],
    ) -> Result<CategoryWithFields, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query =
            format!("INSERT INTO categories (name, icon) VALUES ($1, $2) RETURNING {COLUMNS}");
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.icon)
            .fetch_one(&mut *tx)
            .await?;

        let mut custom_fields = Vec::with_capacity(fields.len());
        for field in fields {
            let definition = Self::insert_linked_definition(&mut tx, category.id, field).await?;
            custom_fields.push(definition);
        }

        tx.commit().await?;
        Ok(CategoryWithFields {
            category,
            custom_fields,
        })
    }

    /// Find a category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a category by ID, enriched with its linked definitions.
    pub async fn find_with_fields(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CategoryWithFields>, sqlx::Error> {
        let Some(category) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let custom_fields = Self::linked_definitions(pool, id).await?;
        Ok(Some(CategoryWithFields {
            category,
            custom_fields,
        }))
    }

    /// List categories by id, each with its linked definitions.
    pub async fn list_with_fields(pool: &PgPool) -> Result<Vec<CategoryWithFields>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY id");
        let categories = sqlx::query_as::<_, Category>(&query)
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = categories.iter().map(|c| c.id).collect();
        let mut by_category = Self::definitions_for_categories(pool, &ids).await?;

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithFields {
                custom_fields: by_category.remove(&category.id).unwrap_or_default(),
                category,
            })
            .collect())
    }

    /// Fetch the categories with the given ids (unordered).
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = ANY($1)");
        sqlx::query_as::<_, Category>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Definitions linked to a category, in creation order.
    pub async fn linked_definitions(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<FieldDefinition>, sqlx::Error> {
        let query = format!(
            "SELECT {FD_COLUMNS} \
             FROM field_definitions fd \
             JOIN category_field_links l ON l.field_definition_id = fd.id \
             WHERE l.category_id = $1 \
             ORDER BY fd.id"
        );
        sqlx::query_as::<_, FieldDefinition>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// The validation schema of a category.
    pub async fn schema(pool: &PgPool, category_id: DbId) -> Result<Vec<FieldSchema>, sqlx::Error> {
        let definitions = Self::linked_definitions(pool, category_id).await?;
        Ok(definitions.iter().map(FieldDefinition::field_schema).collect())
    }

    /// Apply column changes and, when `fields` is given, replace the
    /// category's definitions with it, all in one transaction.
    ///
    /// `fields` is diffed against the definitions linked while the category
    /// row is locked: known ids are updated in place, entries without an id
    /// are created and linked ones left out are unlinked. Unlinked
    /// definitions take the category's rental values for them along, and are
    /// deleted outright once no category references them. An in-place update
    /// is rejected if any stored value no longer fits the new definition.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_with_diff(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
        fields: Option<Vec<FieldDefinitionInput>>,
    ) -> Result<Option<CategoryUpdateOutcome>, RepoError> {
        let mut tx = pool.begin().await?;

        let current_icon: Option<String> =
            sqlx::query_scalar("SELECT icon FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current_icon) = current_icon else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE categories SET \
                name = COALESCE($2, name), \
                icon = COALESCE($3, icon) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.icon)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(fields) = fields {
            let linked: Vec<DbId> = sqlx::query_scalar(
                "SELECT field_definition_id FROM category_field_links \
                 WHERE category_id = $1 ORDER BY field_definition_id",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
            let diff = diff_definitions(&linked, fields)?;
            Self::apply_diff(&mut tx, id, &diff).await?;
        }

        let query = format!(
            "SELECT {FD_COLUMNS} \
             FROM field_definitions fd \
             JOIN category_field_links l ON l.field_definition_id = fd.id \
             WHERE l.category_id = $1 \
             ORDER BY fd.id"
        );
        let custom_fields = sqlx::query_as::<_, FieldDefinition>(&query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let replaced_icon = input
            .icon
            .as_ref()
            .filter(|icon| **icon != current_icon)
            .map(|_| current_icon);

        Ok(Some(CategoryUpdateOutcome {
            category: CategoryWithFields {
                category,
                custom_fields,
            },
            replaced_icon,
        }))
    }

    /// Delete a category. Its rentals cascade; definitions left without any
    /// category are deleted in the same transaction.
    ///
    /// Returns the public URLs of files the deleted rows referenced (icon,
    /// rental images, rental PDFs), or `None` if no such category exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<SupersededFiles>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let icon: Option<String> =
            sqlx::query_scalar("SELECT icon FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(icon) = icon else {
            return Ok(None);
        };

        let mut urls = vec![icon];
        let rental_files: Vec<String> = sqlx::query_scalar(
            "SELECT ri.image FROM rental_images ri \
             JOIN rentals r ON r.id = ri.rental_id \
             WHERE r.category_id = $1 \
             UNION ALL \
             SELECT pdf_link FROM rentals WHERE category_id = $1 AND pdf_link IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        urls.extend(rental_files);

        let linked: Vec<DbId> = sqlx::query_scalar(
            "SELECT field_definition_id FROM category_field_links WHERE category_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::delete_orphans(&mut tx, &linked).await?;

        tx.commit().await?;
        Ok(Some(SupersededFiles { urls }))
    }

    /// Set the informational lock flag. Returns `None` if the category is missing.
    pub async fn set_locked(
        pool: &PgPool,
        id: DbId,
        locked: bool,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query =
            format!("UPDATE categories SET is_locked = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(locked)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Linked definitions for several categories, grouped by category id.
    async fn definitions_for_categories(
        pool: &PgPool,
        category_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<FieldDefinition>>, sqlx::Error> {
        let query = format!(
            "SELECT l.category_id, {FD_COLUMNS} \
             FROM field_definitions fd \
             JOIN category_field_links l ON l.field_definition_id = fd.id \
             WHERE l.category_id = ANY($1) \
             ORDER BY fd.id"
        );
        let rows = sqlx::query_as::<_, LinkedDefinition>(&query)
            .bind(category_ids)
            .fetch_all(pool)
            .await?;

        let mut grouped: HashMap<DbId, Vec<FieldDefinition>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.category_id)
                .or_default()
                .push(FieldDefinition::from(row));
        }
        Ok(grouped)
    }

    /// Insert a definition and link it to a category.
    async fn insert_linked_definition(
        tx: &mut Tx<'_>,
        category_id: DbId,
        field: &FieldDefinitionInput,
    ) -> Result<FieldDefinition, sqlx::Error> {
        let query = format!(
            "INSERT INTO field_definitions (name, field_type, min_size, max_size, icon) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {FIELD_COLUMNS}"
        );
        let definition = sqlx::query_as::<_, FieldDefinition>(&query)
            .bind(field.name.trim())
            .bind(field.field_type.as_str())
            .bind(field.min_size)
            .bind(field.max_size)
            .bind(&field.icon)
            .fetch_one(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO category_field_links (category_id, field_definition_id) VALUES ($1, $2)",
        )
        .bind(category_id)
        .bind(definition.id)
        .execute(&mut **tx)
        .await?;

        Ok(definition)
    }

    /// Apply a definition diff within an existing transaction.
    async fn apply_diff(
        tx: &mut Tx<'_>,
        category_id: DbId,
        diff: &DefinitionDiff,
    ) -> Result<(), RepoError> {
        for (definition_id, field) in &diff.update {
            sqlx::query(
                "UPDATE field_definitions SET \
                    name = $2, field_type = $3, min_size = $4, max_size = $5, icon = $6 \
                 WHERE id = $1",
            )
            .bind(definition_id)
            .bind(field.name.trim())
            .bind(field.field_type.as_str())
            .bind(field.min_size)
            .bind(field.max_size)
            .bind(&field.icon)
            .execute(&mut **tx)
            .await?;

            let schema = FieldSchema {
                id: *definition_id,
                name: field.name.trim().to_string(),
                field_type: field.field_type,
                min_size: field.min_size,
                max_size: field.max_size,
            };
            Self::check_stored_values(tx, &schema).await?;
        }

        for field in &diff.create {
            Self::insert_linked_definition(tx, category_id, field).await?;
        }

        if !diff.remove.is_empty() {
            sqlx::query(
                "DELETE FROM rental_custom_values v \
                 USING rentals r \
                 WHERE v.rental_id = r.id \
                   AND r.category_id = $1 \
                   AND v.field_definition_id = ANY($2)",
            )
            .bind(category_id)
            .bind(&diff.remove)
            .execute(&mut **tx)
            .await?;

            sqlx::query(
                "DELETE FROM category_field_links \
                 WHERE category_id = $1 AND field_definition_id = ANY($2)",
            )
            .bind(category_id)
            .bind(&diff.remove)
            .execute(&mut **tx)
            .await?;

            Self::delete_orphans(tx, &diff.remove).await?;
        }

        Ok(())
    }

    /// Fail if any stored value of the definition does not parse under `schema`.
    async fn check_stored_values(tx: &mut Tx<'_>, schema: &FieldSchema) -> Result<(), RepoError> {
        let values: Vec<String> = sqlx::query_scalar(
            "SELECT value FROM rental_custom_values WHERE field_definition_id = $1",
        )
        .bind(schema.id)
        .fetch_all(&mut **tx)
        .await?;

        let misfits = values
            .iter()
            .filter(|raw| parse_value(schema, raw).is_err())
            .count();
        if misfits > 0 {
            tracing::debug!(definition_id = schema.id, misfits, "Definition change rejected");
            return Err(CoreError::Validation(format!(
                "Custom field '{}' cannot be changed: {misfits} stored value(s) would no longer \
                 fit it",
                schema.name
            ))
            .into());
        }
        Ok(())
    }

    /// Delete those of `candidates` that no category links any more.
    async fn delete_orphans(tx: &mut Tx<'_>, candidates: &[DbId]) -> Result<u64, sqlx::Error> {
        if candidates.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM field_definitions fd \
             WHERE fd.id = ANY($1) \
               AND NOT EXISTS ( \
                   SELECT 1 FROM category_field_links l WHERE l.field_definition_id = fd.id \
               )",
        )
        .bind(candidates)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() > 0 {
            tracing::debug!(
                deleted = result.rows_affected(),
                "Deleted orphaned field definitions"
            );
        }
        Ok(result.rows_affected())
    }
}
