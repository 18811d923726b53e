//! Integration tests for the generated OpenAPI document and Swagger UI.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn openapi_document_lists_routes_and_schemas(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = get(test.app(), "/api-docs/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["openapi"].as_str().unwrap().starts_with("3."));
    assert_eq!(json["info"]["title"], "Rentora API");

    let paths = json["paths"].as_object().unwrap();
    for path in [
        "/health",
        "/api/user/login",
        "/api/rentals",
        "/api/rentals/{id}",
        "/api/categories/{id}",
        "/api/docs/{doc_type}",
    ] {
        assert!(paths.contains_key(path), "missing path {path}");
    }
    assert!(paths["/api/categories/{id}"]["put"].is_object());
    assert!(paths["/api/rentals/{id}"]["delete"].is_object());

    let schemas = json["components"]["schemas"].as_object().unwrap();
    for schema in ["RentalListing", "CategoryWithFields", "FieldDefinitionInput", "ErrorBody"] {
        assert!(schemas.contains_key(schema), "missing schema {schema}");
    }

    let bearer = &json["components"]["securitySchemes"]["bearer"];
    assert_eq!(bearer["type"], "http");
    assert_eq!(bearer["scheme"], "bearer");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn swagger_ui_is_served(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = get(test.app(), "/swagger-ui/").await;

    assert_eq!(response.status(), StatusCode::OK);
}
