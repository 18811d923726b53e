//! Rental listing status buckets, scalar field checks, and image ordering.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Listing bucket a rental is shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    #[default]
    Pending,
    Approved,
    Blocked,
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 3] = [Self::Pending, Self::Approved, Self::Blocked];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid rental status '{s}'. Valid statuses: pending, approved, blocked"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Scalar fields
// ---------------------------------------------------------------------------

/// Validate a listing price: finite and not negative.
pub fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

/// Parse a price sent as a form field.
pub fn parse_price(raw: &str) -> Result<f64, CoreError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("price must be a number, got '{raw}'")))?;
    validate_price(price)?;
    Ok(price)
}

/// Parse a boolean form field (`true`/`false`/`1`/`0`, case-insensitive).
pub fn parse_flag(field: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" | "" => Ok(false),
        other => Err(CoreError::Validation(format!(
            "{field} must be a boolean, got '{other}'"
        ))),
    }
}

/// Require a text field to be present and non-blank.
pub fn require_text(field: &str, value: Option<String>) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{field} is required"))),
    }
}

// ---------------------------------------------------------------------------
// Image ordering
// ---------------------------------------------------------------------------

/// A single `{id, order}` pair from a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageOrder {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub order: i32,
}

/// Check that a reorder request only touches images of the rental, each at
/// most once, with non-negative positions.
pub fn validate_reorder(
    rental_image_ids: &[DbId],
    updates: &[ImageOrder],
) -> Result<(), CoreError> {
    if updates.is_empty() {
        return Err(CoreError::Validation(
            "Reorder request must contain at least one image".into(),
        ));
    }

    let owned: HashSet<DbId> = rental_image_ids.iter().copied().collect();
    let mut seen = HashSet::new();

    for update in updates {
        if !owned.contains(&update.id) {
            return Err(CoreError::Validation(format!(
                "Image {} does not belong to this rental",
                update.id
            )));
        }
        if !seen.insert(update.id) {
            return Err(CoreError::Validation(format!(
                "Image {} appears more than once",
                update.id
            )));
        }
        if update.order < 0 {
            return Err(CoreError::Validation(format!(
                "Image {} has a negative order",
                update.id
            )));
        }
    }
    Ok(())
}

/// Positions assigned to freshly uploaded images: their upload index.
pub fn upload_positions(count: usize) -> impl Iterator<Item = i32> {
    (0..count).map(|i| i32::try_from(i).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(RentalStatus::default(), RentalStatus::Pending);
    }

    #[test]
    fn status_parse() {
        assert_eq!("approved".parse::<RentalStatus>().unwrap(), RentalStatus::Approved);
        assert_matches!("archived".parse::<RentalStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn price_rules() {
        assert_eq!(parse_price(" 120.5 ").unwrap(), 120.5);
        assert_eq!(parse_price("0").unwrap(), 0.0);
        assert!(parse_price("-1").is_err());
        assert!(parse_price("cheap").is_err());
        assert!(parse_price("NaN").is_err());
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("featured", "true").unwrap());
        assert!(parse_flag("featured", "1").unwrap());
        assert!(!parse_flag("featured", "FALSE").unwrap());
        assert!(parse_flag("featured", "maybe").is_err());
    }

    #[test]
    fn required_text() {
        assert_eq!(require_text("name", Some("Villa".into())).unwrap(), "Villa");
        assert!(require_text("name", Some("   ".into())).is_err());
        assert!(require_text("name", None).is_err());
    }

    #[test]
    fn reorder_accepts_subset_of_owned_images() {
        let updates = [ImageOrder { id: 2, order: 0 }, ImageOrder { id: 1, order: 1 }];
        assert!(validate_reorder(&[1, 2, 3], &updates).is_ok());
    }

    #[test]
    fn reorder_rejects_foreign_duplicate_and_negative() {
        assert!(validate_reorder(&[1], &[ImageOrder { id: 9, order: 0 }]).is_err());
        assert!(validate_reorder(
            &[1],
            &[ImageOrder { id: 1, order: 0 }, ImageOrder { id: 1, order: 1 }]
        )
        .is_err());
        assert!(validate_reorder(&[1], &[ImageOrder { id: 1, order: -1 }]).is_err());
        assert!(validate_reorder(&[1], &[]).is_err());
    }

    #[test]
    fn upload_positions_follow_index() {
        assert_eq!(upload_positions(3).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
