//! Repository for `rentals` and their `rental_images` and
//! `rental_custom_values` side tables.
//!
//! Writes that touch more than one table run in a single transaction. File
//! URLs that stop being referenced are handed back to the caller, which
//! removes the files once the transaction has committed.

use rentora_core::rentals::ImageOrder;
use rentora_core::types::DbId;
use sqlx::PgPool;

use crate::models::rental::{
    CreateRental, NewCustomValue, NewImage, Rental, RentalImage, RentalReplacements,
    SupersededFiles, UpdateRental,
};

/// Column list for the `rentals` table.
const COLUMNS: &str = "id, name, description, address, price, unit_of_numeration, status, \
    featured, category_id, rent_time_id, user_id, pdf_link, created_at, updated_at";

/// Column list for the `rental_images` table.
const IMAGE_COLUMNS: &str = "id, rental_id, image, sort_order, created_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Provides persistence for rentals.
pub struct RentalRepo;

impl RentalRepo {
    /// Insert a rental with its images and custom values in one transaction.
    pub async fn create_full(
        pool: &PgPool,
        input: &CreateRental,
        images: &[NewImage],
        values: &[NewCustomValue],
    ) -> Result<Rental, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO rentals \
                (name, description, address, price, unit_of_numeration, status, featured, \
                 category_id, rent_time_id, user_id, pdf_link) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        let rental = sqlx::query_as::<_, Rental>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.address)
            .bind(input.price)
            .bind(&input.unit_of_numeration)
            .bind(&input.status)
            .bind(input.featured)
            .bind(input.category_id)
            .bind(input.rent_time_id)
            .bind(input.user_id)
            .bind(&input.pdf_link)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_images(&mut tx, rental.id, images).await?;
        Self::insert_values(&mut tx, rental.id, values).await?;

        tx.commit().await?;
        Ok(rental)
    }

    /// Update a rental's columns and replace its side tables as requested,
    /// in one transaction.
    ///
    /// When the category changes and no replacement value set is given,
    /// values for definitions outside the new category are dropped.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_full(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRental,
        replacements: &RentalReplacements,
    ) -> Result<Option<(Rental, SupersededFiles)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<(DbId, Option<String>)> = sqlx::query_as(
            "SELECT category_id, pdf_link FROM rentals WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((old_category_id, old_pdf)) = current else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE rentals SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                address = COALESCE($4, address), \
                price = COALESCE($5, price), \
                unit_of_numeration = COALESCE($6, unit_of_numeration), \
                status = COALESCE($7, status), \
                featured = COALESCE($8, featured), \
                category_id = COALESCE($9, category_id), \
                rent_time_id = COALESCE($10, rent_time_id), \
                pdf_link = COALESCE($11, pdf_link) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let rental = sqlx::query_as::<_, Rental>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.address)
            .bind(input.price)
            .bind(&input.unit_of_numeration)
            .bind(&input.status)
            .bind(input.featured)
            .bind(input.category_id)
            .bind(input.rent_time_id)
            .bind(&input.pdf_link)
            .fetch_one(&mut *tx)
            .await?;

        let mut superseded = SupersededFiles::default();

        if let Some(images) = &replacements.images {
            let old: Vec<String> = sqlx::query_scalar(
                "DELETE FROM rental_images WHERE rental_id = $1 RETURNING image",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
            superseded.urls.extend(old);
            Self::insert_images(&mut tx, id, images).await?;
        }

        if let Some(values) = &replacements.custom_values {
            sqlx::query("DELETE FROM rental_custom_values WHERE rental_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_values(&mut tx, id, values).await?;
        } else if rental.category_id != old_category_id {
            sqlx::query(
                "DELETE FROM rental_custom_values \
                 WHERE rental_id = $1 \
                   AND field_definition_id NOT IN ( \
                       SELECT field_definition_id FROM category_field_links WHERE category_id = $2 \
                   )",
            )
            .bind(id)
            .bind(rental.category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        if let Some(old_pdf) = old_pdf {
            if rental.pdf_link.as_deref() != Some(old_pdf.as_str()) {
                superseded.urls.push(old_pdf);
            }
        }

        Ok(Some((rental, superseded)))
    }

    /// Find a rental by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Rental>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rentals WHERE id = $1");
        sqlx::query_as::<_, Rental>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rental; images and custom values cascade.
    ///
    /// Returns the URLs of the files the rental referenced, or `None` if no
    /// such rental exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<SupersededFiles>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let images: Vec<String> =
            sqlx::query_scalar("SELECT image FROM rental_images WHERE rental_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let deleted: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM rentals WHERE id = $1 RETURNING pdf_link")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(pdf) = deleted else {
            return Ok(None);
        };

        tx.commit().await?;

        let mut urls = images;
        urls.extend(pdf);
        Ok(Some(SupersededFiles { urls }))
    }

    /// Set the moderation status. Returns `None` if the rental is missing.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Rental>, sqlx::Error> {
        let query = format!("UPDATE rentals SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Rental>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Set the featured flag. Returns `None` if the rental is missing.
    pub async fn set_featured(
        pool: &PgPool,
        id: DbId,
        featured: bool,
    ) -> Result<Option<Rental>, sqlx::Error> {
        let query = format!("UPDATE rentals SET featured = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Rental>(&query)
            .bind(id)
            .bind(featured)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Ids of a rental's images.
    pub async fn image_ids(pool: &PgPool, rental_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM rental_images WHERE rental_id = $1")
            .bind(rental_id)
            .fetch_all(pool)
            .await
    }

    /// A rental's images, ordered by position then id.
    pub async fn images(pool: &PgPool, rental_id: DbId) -> Result<Vec<RentalImage>, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM rental_images \
             WHERE rental_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, RentalImage>(&query)
            .bind(rental_id)
            .fetch_all(pool)
            .await
    }

    /// Patch image positions in place and return the reordered set.
    ///
    /// Ownership of every id must already have been checked.
    pub async fn reorder_images(
        pool: &PgPool,
        rental_id: DbId,
        updates: &[ImageOrder],
    ) -> Result<Vec<RentalImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        for update in updates {
            sqlx::query(
                "UPDATE rental_images SET sort_order = $3 WHERE id = $1 AND rental_id = $2",
            )
            .bind(update.id)
            .bind(rental_id)
            .bind(update.order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::images(pool, rental_id).await
    }

    /// Delete one image row. Returns the deleted row, or `None` if missing.
    pub async fn delete_image(
        pool: &PgPool,
        image_id: DbId,
    ) -> Result<Option<RentalImage>, sqlx::Error> {
        let query = format!("DELETE FROM rental_images WHERE id = $1 RETURNING {IMAGE_COLUMNS}");
        sqlx::query_as::<_, RentalImage>(&query)
            .bind(image_id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_images(
        tx: &mut Tx<'_>,
        rental_id: DbId,
        images: &[NewImage],
    ) -> Result<(), sqlx::Error> {
        for image in images {
            sqlx::query(
                "INSERT INTO rental_images (rental_id, image, sort_order) VALUES ($1, $2, $3)",
            )
            .bind(rental_id)
            .bind(&image.image)
            .bind(image.order)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn insert_values(
        tx: &mut Tx<'_>,
        rental_id: DbId,
        values: &[NewCustomValue],
    ) -> Result<(), sqlx::Error> {
        for value in values {
            sqlx::query(
                "INSERT INTO rental_custom_values (rental_id, field_definition_id, value) \
                 VALUES ($1, $2, $3)",
            )
            .bind(rental_id)
            .bind(value.field_definition_id)
            .bind(&value.value)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
