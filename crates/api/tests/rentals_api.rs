//! Integration tests for `/api/rentals`: multipart create and update with
//! typed custom values, images, brochures, moderation and deletion.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, body_json, delete_auth, file, get, patch_json_auth, pdf_bytes, png_bytes,
    post_json_auth, send_multipart, text, TestApp,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A "Villas" category with `Area` (int, 10..=1000) and `View` (string, 2..=50).
/// Returns `(category_id, area_id, view_id)`.
async fn villas(test: &TestApp, token: &str) -> (i64, i64, i64) {
    let fields = json!([
        {"name": "Area", "type": "int", "minSize": 10, "maxSize": 1000},
        {"name": "View", "type": "string", "minSize": 2, "maxSize": 50},
    ]);
    let response = send_multipart(
        test.app(),
        Method::POST,
        "/api/categories/create",
        &[
            text("name", "Villas"),
            text("customFields", fields.to_string()),
            file("icon", "villa.png", png_bytes()),
        ],
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["id"].as_i64().unwrap(),
        json["customFields"][0]["id"].as_i64().unwrap(),
        json["customFields"][1]["id"].as_i64().unwrap(),
    )
}

fn custom_data(entries: &[(i64, &str)]) -> String {
    let entries: Vec<Value> = entries
        .iter()
        .map(|(id, value)| json!({"categoriesDataId": id, "value": value}))
        .collect();
    Value::Array(entries).to_string()
}

/// Create a rental in `category_id` and return the listing JSON.
async fn create_rental(
    test: &TestApp,
    token: &str,
    category_id: i64,
    extra: Vec<common::Part>,
) -> Value {
    let mut parts = vec![
        text("name", "Sea view villa"),
        text("price", "250"),
        text("unitOfNumeration", "EUR"),
        text("categoryId", category_id.to_string()),
    ];
    parts.extend(extra);
    let response = send_multipart(test.app(), Method::POST, "/api/rentals", &parts, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rental_with_typed_custom_value(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, area_id, _) = villas(&test, &token).await;

    let listing = create_rental(
        &test,
        &token,
        category_id,
        vec![text("customData", custom_data(&[(area_id, "250")]))],
    )
    .await;

    assert_eq!(listing["name"], "Sea view villa");
    assert_eq!(listing["price"], 250.0);
    assert_eq!(listing["status"], "pending");
    assert_eq!(listing["featured"], false);
    assert_eq!(listing["category"]["name"], "Villas");
    assert!(listing["rentTime"].is_null());

    let value = &listing["customData"][0];
    assert_eq!(value["categoriesDataId"], area_id);
    assert_eq!(value["name"], "Area");
    assert_eq!(value["type"], "int");
    assert_eq!(value["value"], "250");
    assert_eq!(value["typedValue"], json!({"type": "int", "value": 250}));

    let id = listing["id"].as_i64().unwrap();
    let fetched = body_json(get(test.app(), &format!("/api/rentals/{id}")).await).await;
    assert_eq!(fetched["customData"], listing["customData"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_invalid_custom_values(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, area_id, view_id) = villas(&test, &token).await;

    let cases = [
        custom_data(&[(area_id, "5")]),
        custom_data(&[(area_id, "abc")]),
        custom_data(&[(view_id, "x")]),
        custom_data(&[(area_id + view_id + 100, "250")]),
        "not json".to_string(),
    ];
    for case in cases {
        let response = send_multipart(
            test.app(),
            Method::POST,
            "/api/rentals",
            &[
                text("name", "Sea view villa"),
                text("price", "250"),
                text("unitOfNumeration", "EUR"),
                text("categoryId", category_id.to_string()),
                text("customData", case.clone()),
                file("images", "a.png", png_bytes()),
            ],
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "customData {case}");
    }

    assert_eq!(count(&pool, "rentals").await, 0);
    assert_eq!(test.stored_count("rentals"), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_requires_core_fields(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, _, _) = villas(&test, &token).await;

    let response = send_multipart(
        test.app(),
        Method::POST,
        "/api/rentals",
        &[
            text("name", "Sea view villa"),
            text("unitOfNumeration", "EUR"),
            text("categoryId", category_id.to_string()),
        ],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "price is required");

    let response = send_multipart(
        test.app(),
        Method::POST,
        "/api/rentals",
        &[
            text("name", "Sea view villa"),
            text("price", "-3"),
            text("unitOfNumeration", "EUR"),
            text("categoryId", category_id.to_string()),
        ],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_multipart(
        test.app(),
        Method::POST,
        "/api/rentals",
        &[
            text("name", "Sea view villa"),
            text("price", "250"),
            text("unitOfNumeration", "EUR"),
            text("categoryId", "999"),
        ],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Category 999 does not exist");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn images_keep_upload_order_and_pdf_is_stored(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, _, _) = villas(&test, &token).await;

    let listing = create_rental(
        &test,
        &token,
        category_id,
        vec![
            file("images[]", "a.png", png_bytes()),
            file("images[]", "b.png", png_bytes()),
            file("images", "c.png", png_bytes()),
            file("pdf", "brochure.pdf", pdf_bytes()),
        ],
    )
    .await;

    let images = listing["images"].as_array().unwrap();
    assert_eq!(images.len(), 3);
    let orders: Vec<i64> = images.iter().map(|i| i["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    for image in images {
        let url = image["image"].as_str().unwrap();
        assert!(url.starts_with("/static/rentals/") && url.ends_with(".png"));
        assert!(test.file_for(url).exists());
    }

    let pdf = listing["pdfLink"].as_str().unwrap();
    assert!(pdf.starts_with("/static/pdfs/"));
    assert_eq!(std::fs::read(test.file_for(pdf)).unwrap(), pdf_bytes());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_non_pdf_brochure(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, _, _) = villas(&test, &token).await;

    let response = send_multipart(
        test.app(),
        Method::POST,
        "/api/rentals",
        &[
            text("name", "Sea view villa"),
            text("price", "250"),
            text("unitOfNumeration", "EUR"),
            text("categoryId", category_id.to_string()),
            file("pdf", "brochure.pdf", png_bytes()),
        ],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count(&pool, "rentals").await, 0);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_replaces_values_and_images(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, area_id, view_id) = villas(&test, &token).await;

    let listing = create_rental(
        &test,
        &token,
        category_id,
        vec![
            text("customData", custom_data(&[(area_id, "250"), (view_id, "sea")])),
            file("images", "a.png", png_bytes()),
        ],
    )
    .await;
    let id = listing["id"].as_i64().unwrap();
    let old_image = listing["images"][0]["image"].as_str().unwrap().to_string();

    let response = send_multipart(
        test.app(),
        Method::PUT,
        &format!("/api/rentals/{id}"),
        &[
            text("price", "300"),
            text("customData", custom_data(&[(area_id, "400")])),
            file("images", "b.png", png_bytes()),
            file("images", "c.png", png_bytes()),
        ],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Sea view villa");
    assert_eq!(updated["price"], 300.0);
    assert_eq!(updated["customData"].as_array().unwrap().len(), 1);
    assert_eq!(updated["customData"][0]["value"], "400");
    assert_eq!(updated["images"].as_array().unwrap().len(), 2);
    assert!(!test.file_for(&old_image).exists());
    assert_eq!(test.stored_count("rentals"), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_update_leaves_rental_untouched(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, area_id, _) = villas(&test, &token).await;

    let listing = create_rental(
        &test,
        &token,
        category_id,
        vec![text("customData", custom_data(&[(area_id, "250")]))],
    )
    .await;
    let id = listing["id"].as_i64().unwrap();

    let response = send_multipart(
        test.app(),
        Method::PUT,
        &format!("/api/rentals/{id}"),
        &[
            text("name", "Renamed"),
            text("customData", custom_data(&[(area_id, "5000")])),
            file("images", "b.png", png_bytes()),
        ],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let fetched = body_json(get(test.app(), &format!("/api/rentals/{id}")).await).await;
    assert_eq!(fetched["name"], "Sea view villa");
    assert_eq!(fetched["customData"][0]["value"], "250");
    assert_eq!(test.stored_count("rentals"), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_unknown_rental_returns_404(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;

    let response = send_multipart(
        test.app(),
        Method::PUT,
        "/api/rentals/999",
        &[text("name", "Nothing")],
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing and moderation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_filters(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, _, _) = villas(&test, &token).await;

    let first = create_rental(&test, &token, category_id, vec![]).await;
    let second = create_rental(
        &test,
        &token,
        category_id,
        vec![text("featured", "true"), text("status", "approved")],
    )
    .await;

    let all = body_json(get(test.app(), "/api/rentals").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["id"], second["id"]);

    let featured = body_json(get(test.app(), "/api/rentals/featured").await).await;
    assert_eq!(featured.as_array().unwrap().len(), 1);
    assert_eq!(featured[0]["id"], second["id"]);

    let pending = body_json(get(test.app(), "/api/rentals/status/pending").await).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["id"], first["id"]);

    let by_category =
        body_json(get(test.app(), &format!("/api/rentals/category/{category_id}")).await).await;
    assert_eq!(by_category.as_array().unwrap().len(), 2);

    let page = body_json(get(test.app(), "/api/rentals?page=2&limit=1").await).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["id"], first["id"]);

    let response = get(test.app(), "/api/rentals/status/archived").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn set_status_and_featured(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, _, _) = villas(&test, &token).await;
    let id = create_rental(&test, &token, category_id, vec![]).await["id"]
        .as_i64()
        .unwrap();

    let response = patch_json_auth(
        test.app(),
        &format!("/api/rentals/{id}/status"),
        json!({"status": "approved"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "approved");

    let response = patch_json_auth(
        test.app(),
        &format!("/api/rentals/{id}/status"),
        json!({"status": "sold"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(
        test.app(),
        &format!("/api/rentals/{id}/featured"),
        json!({"featured": true}),
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["featured"], true);
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn reorder_and_delete_images(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, _, _) = villas(&test, &token).await;

    let listing = create_rental(
        &test,
        &token,
        category_id,
        vec![
            file("images", "a.png", png_bytes()),
            file("images", "b.png", png_bytes()),
        ],
    )
    .await;
    let id = listing["id"].as_i64().unwrap();
    let a = listing["images"][0]["id"].as_i64().unwrap();
    let b = listing["images"][1]["id"].as_i64().unwrap();

    let response = patch_json_auth(
        test.app(),
        &format!("/api/rentals/{id}/images/order"),
        json!([{"id": a, "order": 1}, {"id": b, "order": 0}]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let images = body_json(response).await;
    assert_eq!(images[0]["id"], b);
    assert_eq!(images[1]["id"], a);

    // An image of another rental cannot be reordered through this one.
    let other = create_rental(
        &test,
        &token,
        category_id,
        vec![file("images", "c.png", png_bytes())],
    )
    .await;
    let foreign = other["images"][0]["id"].as_i64().unwrap();
    let response = patch_json_auth(
        test.app(),
        &format!("/api/rentals/{id}/images/order"),
        json!([{"id": foreign, "order": 0}]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let url = listing["images"][0]["image"].as_str().unwrap().to_string();
    let response = delete_auth(test.app(), &format!("/api/rentals/images/{a}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Image deleted successfully");
    assert!(!test.file_for(&url).exists());

    let fetched = body_json(get(test.app(), &format!("/api/rentals/{id}")).await).await;
    assert_eq!(fetched["images"].as_array().unwrap().len(), 1);

    let response = delete_auth(test.app(), &format!("/api/rentals/images/{a}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_rental_removes_files(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, area_id, _) = villas(&test, &token).await;

    let listing = create_rental(
        &test,
        &token,
        category_id,
        vec![
            text("customData", custom_data(&[(area_id, "250")])),
            file("images", "a.png", png_bytes()),
            file("pdf", "brochure.pdf", pdf_bytes()),
        ],
    )
    .await;
    let id = listing["id"].as_i64().unwrap();

    let response = delete_auth(test.app(), &format!("/api/rentals/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Rental deleted successfully");

    assert_eq!(test.stored_count("rentals"), 0);
    assert_eq!(test.stored_count("pdfs"), 0);
    assert_eq!(count(&pool, "rental_custom_values").await, 0);

    let response = get(test.app(), &format!("/api/rentals/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Rent times
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn rent_time_crud(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;

    let response =
        post_json_auth(test.app(), "/api/rentals/renttime", json!({"name": "Daily"}), &token)
            .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response =
        post_json_auth(test.app(), "/api/rentals/renttime", json!({"name": "  "}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Name is required");

    let response = common::put_json_auth(
        test.app(),
        &format!("/api/rentals/renttime/{id}"),
        json!({"name": "Per day"}),
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["name"], "Per day");

    let list = body_json(get(test.app(), "/api/rentals/renttime").await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = delete_auth(test.app(), &format!("/api/rentals/renttime/{id}"), &token).await;
    assert_eq!(body_json(response).await["message"], "Rent time deleted successfully");

    let response = get(test.app(), &format!("/api/rentals/renttime/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_rent_time_detaches_rentals(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let token = admin_token(&test, &pool).await;
    let (category_id, _, _) = villas(&test, &token).await;

    let response =
        post_json_auth(test.app(), "/api/rentals/renttime", json!({"name": "Daily"}), &token)
            .await;
    let rent_time_id = body_json(response).await["id"].as_i64().unwrap();

    let listing = create_rental(
        &test,
        &token,
        category_id,
        vec![text("rentTimeId", rent_time_id.to_string())],
    )
    .await;
    assert_eq!(listing["rentTime"]["name"], "Daily");
    let id = listing["id"].as_i64().unwrap();

    delete_auth(test.app(), &format!("/api/rentals/renttime/{rent_time_id}"), &token).await;

    let fetched = body_json(get(test.app(), &format!("/api/rentals/{id}")).await).await;
    assert!(fetched["rentTimeId"].is_null());
    assert!(fetched["rentTime"].is_null());
}
