//! Aggregated rental listing payloads.
//!
//! A listing is a rental together with its ordered images, its category, its
//! rent time and its custom values resolved against their field definitions.
//! The rows are batch-fetched by [`ListingRepo`](crate::repositories::ListingRepo)
//! and stitched together here by [`assemble_listings`], which does no I/O.

use std::collections::HashMap;

use rentora_core::custom_fields::{read_stored_value, CustomValue, FieldSchema, FieldType};
use rentora_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::category::Category;
use crate::models::rent_time::RentTime;
use crate::models::rental::{Rental, RentalImage};

/// A stored custom value joined with its field definition.
#[derive(Debug, Clone, FromRow)]
pub struct CustomValueRow {
    pub id: DbId,
    pub rental_id: DbId,
    pub field_definition_id: DbId,
    pub value: String,
    pub name: String,
    pub field_type: String,
    pub icon: Option<String>,
    pub min_size: i32,
    pub max_size: i32,
}

/// A custom value as shown to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCustomValue {
    #[schema(value_type = i64)]
    pub id: DbId,
    #[schema(value_type = i64)]
    pub categories_data_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub icon: Option<String>,
    pub min_size: i32,
    pub max_size: i32,
    /// Canonical stored text.
    pub value: String,
    /// The value parsed against the current definition; `null` when the
    /// stored text does not conform to it.
    pub typed_value: Option<CustomValue>,
}

impl From<CustomValueRow> for ResolvedCustomValue {
    fn from(row: CustomValueRow) -> Self {
        let schema = FieldSchema {
            id: row.field_definition_id,
            name: row.name.clone(),
            field_type: row.field_type.parse().unwrap_or(FieldType::String),
            min_size: row.min_size,
            max_size: row.max_size,
        };
        let typed_value = read_stored_value(&schema, &row.value);
        Self {
            id: row.id,
            categories_data_id: row.field_definition_id,
            name: row.name,
            field_type: row.field_type,
            icon: row.icon,
            min_size: row.min_size,
            max_size: row.max_size,
            value: row.value,
            typed_value,
        }
    }
}

/// A rental with everything a client needs to render it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalListing {
    #[serde(flatten)]
    pub rental: Rental,
    pub images: Vec<RentalImage>,
    pub category: Option<Category>,
    pub rent_time: Option<RentTime>,
    pub custom_data: Vec<ResolvedCustomValue>,
}

/// Which rentals a listing query returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingFilter {
    All,
    Featured,
    Category(DbId),
    Status(String),
}

/// Stitch batch-fetched rows into listings, preserving the order of `rentals`.
///
/// Images are ordered by `order` ascending with ties broken by id; custom
/// values by definition id. Rows that reference a rental not in `rentals` are
/// ignored.
pub fn assemble_listings(
    rentals: Vec<Rental>,
    images: Vec<RentalImage>,
    categories: Vec<Category>,
    rent_times: Vec<RentTime>,
    values: Vec<CustomValueRow>,
) -> Vec<RentalListing> {
    let mut images_by_rental: HashMap<DbId, Vec<RentalImage>> = HashMap::new();
    for image in images {
        images_by_rental.entry(image.rental_id).or_default().push(image);
    }

    let mut values_by_rental: HashMap<DbId, Vec<CustomValueRow>> = HashMap::new();
    for value in values {
        values_by_rental.entry(value.rental_id).or_default().push(value);
    }

    let categories: HashMap<DbId, Category> =
        categories.into_iter().map(|c| (c.id, c)).collect();
    let rent_times: HashMap<DbId, RentTime> =
        rent_times.into_iter().map(|r| (r.id, r)).collect();

    rentals
        .into_iter()
        .map(|rental| {
            let mut images = images_by_rental.remove(&rental.id).unwrap_or_default();
            images.sort_by_key(|img| (img.sort_order, img.id));

            let mut values = values_by_rental.remove(&rental.id).unwrap_or_default();
            values.sort_by_key(|v| (v.field_definition_id, v.id));

            RentalListing {
                category: categories.get(&rental.category_id).cloned(),
                rent_time: rental.rent_time_id.and_then(|id| rent_times.get(&id).cloned()),
                images,
                custom_data: values.into_iter().map(ResolvedCustomValue::from).collect(),
                rental,
            }
        })
        .collect()
}
