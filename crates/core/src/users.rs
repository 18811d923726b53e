//! Account status, registration purpose, and moderation transitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Moderation status of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Approved,
    Blocked,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [Self::Pending, Self::Approved, Self::Blocked];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid status value: \"{s}\"")))
    }
}

// ---------------------------------------------------------------------------
// Purpose
// ---------------------------------------------------------------------------

/// Why the user signed up. Defaults to [`Purpose::Buy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    Buy,
    Sell,
    Rent,
    Collaborate,
    Curious,
}

impl Purpose {
    pub const ALL: [Purpose; 5] = [
        Self::Buy,
        Self::Sell,
        Self::Rent,
        Self::Collaborate,
        Self::Curious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Rent => "rent",
            Self::Collaborate => "collaborate",
            Self::Curious => "curious",
        }
    }
}

impl FromStr for Purpose {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|purpose| purpose.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid purpose value: \"{s}\"")))
    }
}

// ---------------------------------------------------------------------------
// Moderation transitions
// ---------------------------------------------------------------------------

/// A staff action on a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Approve,
    Block,
    Unblock,
}

/// Compute the status that results from applying `action` to `current`.
///
/// `Approve` and `Block` are accepted from any status. `Unblock` is only
/// accepted when the account is currently blocked.
pub fn transition(current: UserStatus, action: StatusAction) -> Result<UserStatus, CoreError> {
    match action {
        StatusAction::Approve => Ok(UserStatus::Approved),
        StatusAction::Block => Ok(UserStatus::Blocked),
        StatusAction::Unblock if current == UserStatus::Blocked => Ok(UserStatus::Approved),
        StatusAction::Unblock => Err(CoreError::Validation(format!(
            "User is not blocked (current status: {current}); unblock is not possible"
        ))),
    }
}
