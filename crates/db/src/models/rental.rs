//! Rental, rental image and rental custom value models.

use rentora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row from the `rentals` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price: f64,
    pub unit_of_numeration: String,
    pub status: String,
    pub featured: bool,
    #[schema(value_type = i64)]
    pub category_id: DbId,
    #[schema(value_type = Option<i64>)]
    pub rent_time_id: Option<DbId>,
    #[schema(value_type = Option<i64>)]
    pub user_id: Option<DbId>,
    pub pdf_link: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

/// A row from the `rental_images` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalImage {
    #[schema(value_type = i64)]
    pub id: DbId,
    #[schema(value_type = i64)]
    pub rental_id: DbId,
    /// Public URL of the stored image.
    pub image: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
}

/// An image to attach to a rental.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub image: String,
    pub order: i32,
}

/// A custom value to attach to a rental, already validated and canonicalised.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomValue {
    pub field_definition_id: DbId,
    pub value: String,
}

/// DTO for creating a rental.
#[derive(Debug, Clone)]
pub struct CreateRental {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price: f64,
    pub unit_of_numeration: String,
    pub status: String,
    pub featured: bool,
    pub category_id: DbId,
    pub rent_time_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub pdf_link: Option<String>,
}

/// DTO for updating a rental's own columns. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateRental {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub unit_of_numeration: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub category_id: Option<DbId>,
    pub rent_time_id: Option<DbId>,
    pub pdf_link: Option<String>,
}

/// Side-table replacements applied together with an [`UpdateRental`].
///
/// `None` leaves the existing set untouched; `Some` replaces it entirely
/// (an empty vector clears it).
#[derive(Debug, Clone, Default)]
pub struct RentalReplacements {
    pub images: Option<Vec<NewImage>>,
    pub custom_values: Option<Vec<NewCustomValue>>,
}

/// Public URLs of files no longer referenced after a write commits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupersededFiles {
    pub urls: Vec<String>,
}
