//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod document_repo;
pub mod listing_repo;
pub mod member_request_repo;
pub mod rent_time_repo;
pub mod rental_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use document_repo::DocumentRepo;
pub use listing_repo::ListingRepo;
pub use member_request_repo::MemberRequestRepo;
pub use rent_time_repo::RentTimeRepo;
pub use rental_repo::RentalRepo;
pub use user_repo::UserRepo;
