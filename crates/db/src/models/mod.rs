//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Create*` / `Update*` DTOs consumed by the repositories
//!
//! Wire names are camelCase.

pub mod category;
pub mod document;
pub mod listing;
pub mod member_request;
pub mod rent_time;
pub mod rental;
pub mod user;
