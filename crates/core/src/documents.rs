//! Legal document kinds.

use std::str::FromStr;

use crate::error::CoreError;

pub const DOC_TERMS: &str = "terms";
pub const DOC_PRIVACY: &str = "privacy";
pub const DOC_COOKIE: &str = "cookie";

/// All valid document types.
pub const VALID_DOC_TYPES: &[&str] = &[DOC_TERMS, DOC_PRIVACY, DOC_COOKIE];

/// A validated document type. Only one document per type is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocType(&'static str);

impl DocType {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl FromStr for DocType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VALID_DOC_TYPES
            .iter()
            .copied()
            .find(|t| *t == s)
            .map(DocType)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid docType '{s}'. Valid types: {}",
                    VALID_DOC_TYPES.join(", ")
                ))
            })
    }
}
