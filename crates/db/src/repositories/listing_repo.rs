//! Read side of rentals: batch-fetches everything a listing needs and hands
//! it to [`assemble_listings`].

use rentora_core::types::DbId;
use sqlx::PgPool;

use crate::models::listing::{assemble_listings, CustomValueRow, ListingFilter, RentalListing};
use crate::models::rental::{Rental, RentalImage};
use crate::repositories::{CategoryRepo, RentTimeRepo};

const COLUMNS: &str = "id, name, description, address, price, unit_of_numeration, status, \
    featured, category_id, rent_time_id, user_id, pdf_link, created_at, updated_at";

/// Provides aggregated rental listings.
pub struct ListingRepo;

impl ListingRepo {
    /// Listings matching `filter`, newest first.
    ///
    /// `page` is an optional `(limit, offset)`; without it every match is
    /// returned.
    pub async fn list(
        pool: &PgPool,
        filter: &ListingFilter,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<RentalListing>, sqlx::Error> {
        let (limit, offset) = match page {
            Some((limit, offset)) => (Some(limit), offset),
            None => (None, 0),
        };

        let query = format!(
            "SELECT {COLUMNS} FROM rentals \
             WHERE ($1 = 'all') \
                OR ($1 = 'featured' AND featured) \
                OR ($1 = 'category' AND category_id = $2) \
                OR ($1 = 'status' AND status = $3) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        let (kind, category_id, status) = filter_binds(filter);
        let rentals = sqlx::query_as::<_, Rental>(&query)
            .bind(kind)
            .bind(category_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Self::hydrate(pool, rentals).await
    }

    /// A single listing by rental id.
    pub async fn find(pool: &PgPool, id: DbId) -> Result<Option<RentalListing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rentals WHERE id = $1");
        let rental = sqlx::query_as::<_, Rental>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match rental {
            Some(rental) => Ok(Self::hydrate(pool, vec![rental]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Batch-fetch the related rows of `rentals` and assemble listings.
    async fn hydrate(
        pool: &PgPool,
        rentals: Vec<Rental>,
    ) -> Result<Vec<RentalListing>, sqlx::Error> {
        if rentals.is_empty() {
            return Ok(Vec::new());
        }

        let rental_ids: Vec<DbId> = rentals.iter().map(|r| r.id).collect();
        let mut category_ids: Vec<DbId> = rentals.iter().map(|r| r.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();
        let mut rent_time_ids: Vec<DbId> = rentals.iter().filter_map(|r| r.rent_time_id).collect();
        rent_time_ids.sort_unstable();
        rent_time_ids.dedup();

        let images = sqlx::query_as::<_, RentalImage>(
            "SELECT id, rental_id, image, sort_order, created_at FROM rental_images \
             WHERE rental_id = ANY($1)",
        )
        .bind(&rental_ids)
        .fetch_all(pool)
        .await?;

        let values = sqlx::query_as::<_, CustomValueRow>(
            "SELECT v.id, v.rental_id, v.field_definition_id, v.value, \
                    fd.name, fd.field_type, fd.icon, fd.min_size, fd.max_size \
             FROM rental_custom_values v \
             JOIN field_definitions fd ON fd.id = v.field_definition_id \
             WHERE v.rental_id = ANY($1)",
        )
        .bind(&rental_ids)
        .fetch_all(pool)
        .await?;

        let categories = CategoryRepo::find_many(pool, &category_ids).await?;
        let rent_times = RentTimeRepo::find_many(pool, &rent_time_ids).await?;

        Ok(assemble_listings(rentals, images, categories, rent_times, values))
    }
}

/// Positional binds for the listing filter: kind, category id, status.
fn filter_binds(filter: &ListingFilter) -> (&'static str, Option<DbId>, Option<&str>) {
    match filter {
        ListingFilter::All => ("all", None, None),
        ListingFilter::Featured => ("featured", None, None),
        ListingFilter::Category(id) => ("category", Some(*id), None),
        ListingFilter::Status(status) => ("status", None, Some(status.as_str())),
    }
}
