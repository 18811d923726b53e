//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in the users migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_USER: &str = "user";

/// Whether the role may manage categories, rentals and other users.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_MODERATOR
}
