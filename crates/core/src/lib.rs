//! Rentora domain logic.
//!
//! Everything in this crate is pure: no database handles, no HTTP types, no
//! filesystem access. The `db` and `api` crates build on these rules.

pub mod custom_fields;
pub mod documents;
pub mod error;
pub mod member_requests;
pub mod pagination;
pub mod rentals;
pub mod roles;
pub mod types;
pub mod uploads;
pub mod users;
