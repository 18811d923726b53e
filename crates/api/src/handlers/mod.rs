pub mod categories;
pub mod docs;
pub mod member_requests;
pub mod rent_times;
pub mod rentals;
pub mod user;
pub mod user_work;
pub mod weather;
