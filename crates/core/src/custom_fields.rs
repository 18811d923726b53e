//! Category custom-field schema and typed rental values.
//!
//! A category carries a set of field definitions (`name`, `type`, `minSize`,
//! `maxSize`, optional `icon`). A rental holds at most one value per
//! definition of its category. Values travel as text on the wire and in the
//! database; this module parses them into [`CustomValue`] and enforces the
//! definition's bounds before anything is written:
//!
//! | type     | parses as                          | bounds apply to    |
//! |----------|------------------------------------|--------------------|
//! | `string` | any text                           | character count    |
//! | `int`    | `i64`                              | the value          |
//! | `double` | finite `f64`                       | the value          |
//! | `date`   | `YYYY-MM-DD` or RFC 3339 timestamp | not applied        |

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of a field definition name.
pub const MAX_FIELD_NAME_LEN: usize = 255;

/// Canonical on-disk format for date values.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Field type
// ---------------------------------------------------------------------------

/// Declared type of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Double,
    Date,
}

impl FieldType {
    pub const ALL: [FieldType; 4] = [Self::String, Self::Int, Self::Double, Self::Date];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Double => "double",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown field type '{s}'. Valid types: string, int, double, date"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A field definition as submitted by a client in `customFields`.
///
/// `id` is only meaningful on category update: it names an already-linked
/// definition to modify in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinitionInput {
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub id: Option<DbId>,
    pub name: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: FieldType,
    pub min_size: i32,
    pub max_size: i32,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_field_type() -> FieldType {
    FieldType::String
}

/// A stored definition reduced to what value validation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub id: DbId,
    pub name: String,
    pub field_type: FieldType,
    pub min_size: i32,
    pub max_size: i32,
}

/// Parse the `customFields` form value (a JSON array) and validate each entry.
pub fn parse_field_definitions(raw: &str) -> Result<Vec<FieldDefinitionInput>, CoreError> {
    let fields: Vec<FieldDefinitionInput> = serde_json::from_str(raw).map_err(|e| {
        CoreError::Validation(format!("customFields must be a valid JSON array: {e}"))
    })?;
    validate_field_definitions(&fields)?;
    Ok(fields)
}

/// Check names, bounds and uniqueness of a definition set.
pub fn validate_field_definitions(fields: &[FieldDefinitionInput]) -> Result<(), CoreError> {
    let mut names = HashSet::new();
    let mut ids = HashSet::new();

    for field in fields {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(
                "Custom field name must not be empty".into(),
            ));
        }
        if name.chars().count() > MAX_FIELD_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "Custom field name must be at most {MAX_FIELD_NAME_LEN} characters"
            )));
        }
        if field.min_size > field.max_size {
            return Err(CoreError::Validation(format!(
                "Custom field '{name}': minSize ({}) must not exceed maxSize ({})",
                field.min_size, field.max_size
            )));
        }
        if field.field_type == FieldType::String && field.min_size < 0 {
            return Err(CoreError::Validation(format!(
                "Custom field '{name}': minSize must not be negative for string fields"
            )));
        }
        if !names.insert(name.to_lowercase()) {
            return Err(CoreError::Validation(format!(
                "Duplicate custom field name '{name}'"
            )));
        }
        if let Some(id) = field.id {
            if !ids.insert(id) {
                return Err(CoreError::Validation(format!(
                    "Custom field id {id} appears more than once"
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Definition diff
// ---------------------------------------------------------------------------

/// Changes needed to move a category's linked definitions to a new set.
#[derive(Debug, Default, PartialEq)]
pub struct DefinitionDiff {
    /// Entries without an id: insert and link.
    pub create: Vec<FieldDefinitionInput>,
    /// Entries whose id is currently linked: update in place.
    pub update: Vec<(DbId, FieldDefinitionInput)>,
    /// Linked ids absent from the new set: unlink (and delete if orphaned).
    pub remove: Vec<DbId>,
}

impl DefinitionDiff {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }
}

/// Diff the currently linked definition ids against an incoming set.
///
/// An incoming entry that names an id not linked to the category is
/// rejected; definitions are only ever edited through a category that owns
/// them.
pub fn diff_definitions(
    linked_ids: &[DbId],
    incoming: Vec<FieldDefinitionInput>,
) -> Result<DefinitionDiff, CoreError> {
    validate_field_definitions(&incoming)?;

    let linked: HashSet<DbId> = linked_ids.iter().copied().collect();
    let mut kept = HashSet::new();
    let mut diff = DefinitionDiff::default();

    for field in incoming {
        match field.id {
            Some(id) if linked.contains(&id) => {
                kept.insert(id);
                diff.update.push((id, field));
            }
            Some(id) => {
                return Err(CoreError::Validation(format!(
                    "Custom field {id} is not linked to this category"
                )));
            }
            None => diff.create.push(field),
        }
    }

    diff.remove = linked_ids
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    Ok(diff)
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A custom value parsed according to its definition's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CustomValue {
    String(String),
    Int(i64),
    Double(f64),
    Date(NaiveDate),
}

impl CustomValue {
    /// Text form persisted in `rental_custom_values.value`.
    pub fn canonical(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Double(d) => d.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Parse `raw` as a value of `schema` and check its bounds.
pub fn parse_value(schema: &FieldSchema, raw: &str) -> Result<CustomValue, CoreError> {
    let min = schema.min_size;
    let max = schema.max_size;
    let name = &schema.name;

    match schema.field_type {
        FieldType::String => {
            let len = raw.chars().count();
            if len < min.max(0) as usize || len > max.max(0) as usize {
                return Err(CoreError::Validation(format!(
                    "'{name}' must be between {min} and {max} characters long"
                )));
            }
            Ok(CustomValue::String(raw.to_string()))
        }
        FieldType::Int => {
            let value: i64 = raw.trim().parse().map_err(|_| {
                CoreError::Validation(format!("'{name}' must be an integer, got '{raw}'"))
            })?;
            if value < i64::from(min) || value > i64::from(max) {
                return Err(CoreError::Validation(format!(
                    "'{name}' must be between {min} and {max}, got {value}"
                )));
            }
            Ok(CustomValue::Int(value))
        }
        FieldType::Double => {
            let value: f64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| {
                    CoreError::Validation(format!("'{name}' must be a number, got '{raw}'"))
                })?;
            if value < f64::from(min) || value > f64::from(max) {
                return Err(CoreError::Validation(format!(
                    "'{name}' must be between {min} and {max}, got {value}"
                )));
            }
            Ok(CustomValue::Double(value))
        }
        FieldType::Date => parse_date(raw.trim())
            .map(CustomValue::Date)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "'{name}' must be a date (YYYY-MM-DD), got '{raw}'"
                ))
            }),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Re-read a stored value against its current definition.
///
/// Returns `None` when the stored text does not conform, which only a row
/// written outside the API can produce.
pub fn read_stored_value(schema: &FieldSchema, stored: &str) -> Option<CustomValue> {
    parse_value(schema, stored).ok()
}

// ---------------------------------------------------------------------------
// Rental custom data
// ---------------------------------------------------------------------------

/// One `{categoriesDataId, value}` pair from a rental's `customData`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDataEntry {
    pub categories_data_id: DbId,
    pub value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCustomDataEntry {
    categories_data_id: DbId,
    value: serde_json::Value,
}

/// Parse the `customData` form value (a JSON array of
/// `{categoriesDataId, value}`).
///
/// `value` may be sent as a JSON string, number or boolean; it is kept as
/// text until validated against the definition.
pub fn parse_custom_data(raw: &str) -> Result<Vec<CustomDataEntry>, CoreError> {
    let entries: Vec<RawCustomDataEntry> = serde_json::from_str(raw).map_err(|e| {
        CoreError::Validation(format!("customData must be a valid JSON array: {e}"))
    })?;

    entries
        .into_iter()
        .map(|entry| {
            let value = match entry.value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(CoreError::Validation(format!(
                        "customData value for field {} must be a string or number, got {other}",
                        entry.categories_data_id
                    )))
                }
            };
            Ok(CustomDataEntry {
                categories_data_id: entry.categories_data_id,
                value,
            })
        })
        .collect()
}

/// A value that passed validation and is ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedValue {
    pub field_definition_id: DbId,
    pub value: CustomValue,
}

/// Validate a full custom-data set against a category schema.
///
/// Every entry must reference a definition of the schema, at most once, and
/// parse according to it. All violations are reported together.
pub fn validate_custom_data(
    schema: &[FieldSchema],
    entries: &[CustomDataEntry],
) -> Result<Vec<ValidatedValue>, CoreError> {
    let mut seen = HashSet::new();
    let mut problems = Vec::new();
    let mut validated = Vec::with_capacity(entries.len());

    for entry in entries {
        let id = entry.categories_data_id;
        if !seen.insert(id) {
            problems.push(format!("custom field {id} is set more than once"));
            continue;
        }
        let Some(field) = schema.iter().find(|f| f.id == id) else {
            problems.push(format!("custom field {id} is not part of this category"));
            continue;
        };
        match parse_value(field, &entry.value) {
            Ok(value) => validated.push(ValidatedValue {
                field_definition_id: id,
                value,
            }),
            Err(CoreError::Validation(msg)) => problems.push(msg),
            Err(other) => return Err(other),
        }
    }

    if problems.is_empty() {
        Ok(validated)
    } else {
        Err(CoreError::Validation(format!(
            "Invalid customData: {}",
            problems.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn area() -> FieldSchema {
        FieldSchema {
            id: 1,
            name: "Area".into(),
            field_type: FieldType::Int,
            min_size: 10,
            max_size: 1000,
        }
    }

    fn schema() -> Vec<FieldSchema> {
        vec![
            area(),
            FieldSchema {
                id: 2,
                name: "View".into(),
                field_type: FieldType::String,
                min_size: 2,
                max_size: 8,
            },
            FieldSchema {
                id: 3,
                name: "Rating".into(),
                field_type: FieldType::Double,
                min_size: 0,
                max_size: 5,
            },
            FieldSchema {
                id: 4,
                name: "Available".into(),
                field_type: FieldType::Date,
                min_size: 0,
                max_size: 0,
            },
        ]
    }

    fn entry(id: DbId, value: &str) -> CustomDataEntry {
        CustomDataEntry {
            categories_data_id: id,
            value: value.into(),
        }
    }

    // -- definitions ----------------------------------------------------------

    #[test]
    fn parses_definitions_from_camel_case_json() {
        let fields = parse_field_definitions(
            r#"[{"name":"Area","type":"int","minSize":10,"maxSize":1000}]"#,
        )
        .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Area");
        assert_eq!(fields[0].field_type, FieldType::Int);
        assert_eq!(fields[0].min_size, 10);
        assert_eq!(fields[0].max_size, 1000);
        assert_eq!(fields[0].id, None);
        assert_eq!(fields[0].icon, None);
    }

    #[test]
    fn malformed_definitions_json_rejected() {
        assert_matches!(
            parse_field_definitions("[{name: Area"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            parse_field_definitions(r#"{"name":"Area"}"#),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn unknown_field_type_rejected() {
        assert!(parse_field_definitions(
            r#"[{"name":"Pool","type":"bool","minSize":0,"maxSize":1}]"#
        )
        .is_err());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = parse_field_definitions(
            r#"[{"name":"Area","type":"int","minSize":100,"maxSize":10}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not exceed maxSize"));
    }

    #[test]
    fn duplicate_names_rejected_case_insensitively() {
        assert!(parse_field_definitions(
            r#"[{"name":"Area","type":"int","minSize":1,"maxSize":2},
                {"name":"area","type":"string","minSize":1,"maxSize":2}]"#
        )
        .is_err());
    }

    #[test]
    fn blank_name_rejected() {
        assert!(parse_field_definitions(
            r#"[{"name":"  ","type":"int","minSize":1,"maxSize":2}]"#
        )
        .is_err());
    }

    // -- diff -----------------------------------------------------------------

    fn input(id: Option<DbId>, name: &str) -> FieldDefinitionInput {
        FieldDefinitionInput {
            id,
            name: name.into(),
            field_type: FieldType::String,
            min_size: 0,
            max_size: 10,
            icon: None,
        }
    }

    #[test]
    fn diff_splits_create_update_remove() {
        let diff = diff_definitions(
            &[1, 2, 3],
            vec![input(Some(2), "Kept"), input(None, "Fresh")],
        )
        .unwrap();

        assert_eq!(diff.create, vec![input(None, "Fresh")]);
        assert_eq!(diff.update, vec![(2, input(Some(2), "Kept"))]);
        assert_eq!(diff.remove, vec![1, 3]);
    }

    #[test]
    fn diff_with_empty_incoming_removes_everything() {
        let diff = diff_definitions(&[7, 8], vec![]).unwrap();
        assert!(diff.create.is_empty());
        assert!(diff.update.is_empty());
        assert_eq!(diff.remove, vec![7, 8]);
    }

    #[test]
    fn diff_rejects_foreign_id() {
        assert_matches!(
            diff_definitions(&[1], vec![input(Some(99), "Foreign")]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn identical_set_produces_only_updates() {
        let diff = diff_definitions(&[4], vec![input(Some(4), "Same")]).unwrap();
        assert!(!diff.is_empty());
        assert!(diff.create.is_empty());
        assert!(diff.remove.is_empty());
    }

    // -- values ---------------------------------------------------------------

    #[test]
    fn int_within_bounds_accepted() {
        assert_eq!(parse_value(&area(), "250").unwrap(), CustomValue::Int(250));
        assert_eq!(parse_value(&area(), " 10 ").unwrap(), CustomValue::Int(10));
        assert_eq!(parse_value(&area(), "1000").unwrap(), CustomValue::Int(1000));
    }

    #[test]
    fn int_outside_bounds_rejected() {
        assert!(parse_value(&area(), "9").is_err());
        assert!(parse_value(&area(), "1001").is_err());
    }

    #[test]
    fn non_numeric_int_rejected() {
        assert!(parse_value(&area(), "abc").is_err());
        assert!(parse_value(&area(), "25.5").is_err());
    }

    #[test]
    fn string_bounds_count_characters() {
        let view = &schema()[1];
        assert!(parse_value(view, "x").is_err());
        assert_eq!(
            parse_value(view, "océan").unwrap(),
            CustomValue::String("océan".into())
        );
        assert!(parse_value(view, "panoramic").is_err());
    }

    #[test]
    fn double_rejects_nan_and_out_of_range() {
        let rating = &schema()[2];
        assert_eq!(parse_value(rating, "4.5").unwrap(), CustomValue::Double(4.5));
        assert!(parse_value(rating, "NaN").is_err());
        assert!(parse_value(rating, "inf").is_err());
        assert!(parse_value(rating, "5.01").is_err());
    }

    #[test]
    fn date_accepts_plain_and_rfc3339() {
        let available = &schema()[3];
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(
            parse_value(available, "2025-06-01").unwrap(),
            CustomValue::Date(expected)
        );
        assert_eq!(
            parse_value(available, "2025-06-01T10:00:00Z").unwrap(),
            CustomValue::Date(expected)
        );
        assert!(parse_value(available, "01/06/2025").is_err());
    }

    #[test]
    fn canonical_forms() {
        assert_eq!(CustomValue::Int(250).canonical(), "250");
        assert_eq!(CustomValue::Double(4.5).canonical(), "4.5");
        assert_eq!(
            CustomValue::Date(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()).canonical(),
            "2025-01-02"
        );
    }

    #[test]
    fn custom_value_serializes_tagged() {
        let json = serde_json::to_value(CustomValue::Int(250)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "int", "value": 250 }));
    }

    #[test]
    fn stored_value_that_no_longer_conforms_reads_as_none() {
        let mut changed = area();
        changed.max_size = 100;
        assert_eq!(read_stored_value(&changed, "250"), None);
        assert_eq!(read_stored_value(&area(), "250"), Some(CustomValue::Int(250)));
    }

    // -- custom data ----------------------------------------------------------

    #[test]
    fn custom_data_accepts_string_and_number_values() {
        let raw = r#"[{"categoriesDataId":1,"value":"250"},{"categoriesDataId":3,"value":4.5}]"#;
        let entries = parse_custom_data(raw).unwrap();
        assert_eq!(entries, vec![entry(1, "250"), entry(3, "4.5")]);
    }

    #[test]
    fn malformed_custom_data_rejected() {
        assert_matches!(parse_custom_data("not json"), Err(CoreError::Validation(_)));
        assert_matches!(
            parse_custom_data(r#"[{"categoriesDataId":1,"value":null}]"#),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn valid_set_passes() {
        let validated = validate_custom_data(
            &schema(),
            &[entry(1, "250"), entry(2, "sea"), entry(4, "2025-06-01")],
        )
        .unwrap();
        assert_eq!(validated.len(), 3);
        assert_eq!(validated[0].field_definition_id, 1);
        assert_eq!(validated[0].value, CustomValue::Int(250));
    }

    #[test]
    fn foreign_definition_rejected() {
        let err = validate_custom_data(&schema(), &[entry(42, "x")]).unwrap_err();
        assert!(err.to_string().contains("not part of this category"));
    }

    #[test]
    fn duplicate_definition_rejected() {
        let err = validate_custom_data(&schema(), &[entry(1, "20"), entry(1, "30")]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn all_violations_reported() {
        let err =
            validate_custom_data(&schema(), &[entry(1, "5"), entry(2, "x")]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'Area'"));
        assert!(msg.contains("'View'"));
    }

    #[test]
    fn empty_set_is_valid() {
        assert!(validate_custom_data(&schema(), &[]).unwrap().is_empty());
    }
}
