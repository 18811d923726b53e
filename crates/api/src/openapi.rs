//! OpenAPI document for the HTTP API, served as JSON at
//! `/api-docs/openapi.json` with Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorBody;
use crate::handlers::{
    categories, docs, member_requests, rent_times, rentals, user, user_work, weather,
};
use crate::routes::health;

/// Registers the `bearer` scheme referenced by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rentora API",
        description = "Rental listings with per-category custom fields."
    ),
    modifiers(&SecurityAddon),
    paths(
        health::health,

        user::registration,
        user::login,
        user::admin_login,
        user::check,
        user::admin_check,

        user_work::count_all,
        user_work::count_pending,
        user_work::count_approved,
        user_work::count_blocked,
        user_work::list_users,
        user_work::approve_user,
        user_work::block_user,
        user_work::unblock_user,

        categories::create_category,
        categories::list_categories,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        categories::lock_category,
        categories::unlock_category,

        rentals::create_rental,
        rentals::update_rental,
        rentals::list_rentals,
        rentals::list_featured,
        rentals::list_by_category,
        rentals::list_by_status,
        rentals::get_rental,
        rentals::set_status,
        rentals::set_featured,
        rentals::reorder_images,
        rentals::delete_image,
        rentals::delete_rental,

        rent_times::create_rent_time,
        rent_times::list_rent_times,
        rent_times::get_rent_time,
        rent_times::update_rent_time,
        rent_times::delete_rent_time,

        member_requests::create_request,
        member_requests::list_requests,
        member_requests::update_request,

        docs::upload_doc,
        docs::list_docs,
        docs::get_doc,

        weather::get_weather,
    ),
    components(schemas(
        ErrorBody,
        rentora_core::custom_fields::FieldDefinitionInput,
        rentora_core::custom_fields::CustomValue,
    )),
    tags(
        (name = "health", description = "Readiness"),
        (name = "user", description = "Registration, login and token checks"),
        (name = "user work", description = "Staff moderation of accounts"),
        (name = "categories", description = "Categories and their custom field definitions"),
        (name = "rentals", description = "Rental listings and images"),
        (name = "rent times", description = "Rental period vocabulary"),
        (name = "member requests", description = "Membership requests"),
        (name = "docs", description = "Legal documents"),
        (name = "weather", description = "Weather proxy"),
    )
)]
pub struct ApiDoc;
