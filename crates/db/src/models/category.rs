//! Category and custom-field definition models.

use rentora_core::custom_fields::{FieldSchema, FieldType};
use rentora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub name: String,
    pub icon: String,
    pub is_locked: bool,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

/// A row from the `field_definitions` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub min_size: i32,
    pub max_size: i32,
    pub icon: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

impl FieldDefinition {
    /// Reduce to the shape value validation works with.
    ///
    /// The `chk_field_definitions_type` constraint guarantees a known type;
    /// an unknown one would only come from a hand-edited row and falls back
    /// to `string`.
    pub fn field_schema(&self) -> FieldSchema {
        FieldSchema {
            id: self.id,
            name: self.name.clone(),
            field_type: self.field_type.parse().unwrap_or(FieldType::String),
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }
}

/// A category together with its linked field definitions.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithFields {
    #[serde(flatten)]
    pub category: Category,
    pub custom_fields: Vec<FieldDefinition>,
}

/// DTO for creating a category.
#[derive(Debug)]
pub struct CreateCategory {
    pub name: String,
    /// Public URL of the stored icon.
    pub icon: String,
}

/// DTO for updating a category. `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub icon: Option<String>,
}

/// Result of a category update.
#[derive(Debug)]
pub struct CategoryUpdateOutcome {
    pub category: CategoryWithFields,
    /// Public URL of the icon that was replaced, if any.
    pub replaced_icon: Option<String>,
}
