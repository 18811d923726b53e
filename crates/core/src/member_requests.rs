//! Member request lifecycle rules.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

/// Maximum message length, in characters.
pub const MAX_MESSAGE_LEN: usize = 200;

/// Processing status of a member request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    New,
    Viewed,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [Self::New, Self::Viewed, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Viewed => "viewed",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(
                    "Invalid or missing status. Allowed values: new, viewed, completed.".into(),
                )
            })
    }
}

/// Validate the fields of a new member request.
pub fn validate_new_request(
    member_name: &str,
    email: &str,
    message: &str,
) -> Result<(), CoreError> {
    if member_name.trim().is_empty() || email.trim().is_empty() || message.trim().is_empty() {
        return Err(CoreError::Validation(
            "Missing required fields: memberName, email, and message are required.".into(),
        ));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::Validation(format!(
            "Message exceeds {MAX_MESSAGE_LEN} characters."
        )));
    }
    Ok(())
}
