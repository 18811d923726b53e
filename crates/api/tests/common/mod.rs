#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use rentora_api::auth::jwt::{generate_token, JwtConfig};
use rentora_api::auth::password::hash_password;
use rentora_api::config::{ServerConfig, WeatherConfig};
use rentora_api::router::build_app_router;
use rentora_api::state::AppState;
use rentora_db::models::user::{CreateUser, User};
use rentora_db::repositories::UserRepo;

/// Password given to every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "sea-view-2024";

/// Build a test `ServerConfig` with safe defaults and the given static dir.
///
/// The weather API points at a closed local port so proxy failures are
/// deterministic.
pub fn test_config(static_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        static_dir: static_dir.to_path_buf(),
        max_upload_bytes: 20 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 24,
        },
        weather: WeatherConfig {
            api_url: "http://127.0.0.1:9/v1/current.json".to_string(),
            api_key: "test-key".to_string(),
            default_city: "Palma de Mallorca".to_string(),
        },
    }
}

/// The application under test plus the temporary static directory it
/// writes uploads to. The directory is deleted when this is dropped.
pub struct TestApp {
    router: Router,
    pub config: ServerConfig,
    static_dir: TempDir,
}

impl TestApp {
    /// A fresh handle on the router (routers are cheap to clone).
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn static_dir(&self) -> &Path {
        self.static_dir.path()
    }

    /// Filesystem path behind a `/static/...` URL.
    pub fn file_for(&self, url: &str) -> std::path::PathBuf {
        let rel = url.strip_prefix("/static/").expect("static URL");
        self.static_dir.path().join(rel)
    }

    /// Number of stored files in one upload sub-directory.
    pub fn stored_count(&self, subdir: &str) -> usize {
        match std::fs::read_dir(self.static_dir.path().join(subdir)) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        generate_token(user, &self.config.jwt).expect("token generation should succeed")
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a temporary static directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let static_dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(static_dir.path());
    let state = AppState::new(pool, config.clone());
    let router = build_app_router(state, &config);
    TestApp {
        router,
        config,
        static_dir,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the given role.
pub async fn create_user(pool: &PgPool, email: &str, phone: &str, role: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        fullname: format!("Test {role}"),
        phone: phone.to_string(),
        purpose: None,
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    UserRepo::set_role(pool, user.id, role)
        .await
        .expect("role update should succeed")
        .expect("user exists")
}

/// Token for a freshly created admin.
pub async fn admin_token(app: &TestApp, pool: &PgPool) -> String {
    let admin = create_user(pool, "admin@rentora.test", "+34000000001", "admin").await;
    app.token_for(&admin)
}

/// Token for a freshly created moderator.
pub async fn moderator_token(app: &TestApp, pool: &PgPool) -> String {
    let moderator = create_user(pool, "mod@rentora.test", "+34000000002", "moderator").await;
    app.token_for(&moderator)
}

/// Token for a freshly created regular user.
pub async fn user_token(app: &TestApp, pool: &PgPool) -> String {
    let user = create_user(pool, "user@rentora.test", "+34000000003", "user").await;
    app.token_for(&user)
}

/// Smallest byte string recognised as a PNG.
pub fn png_bytes() -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D]
}

pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n%test\n".to_vec()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(
    method: Method,
    uri: &str,
    body: &serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    builder(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, builder(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = builder(Method::GET, uri, Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = builder(Method::DELETE, uri, Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = builder(Method::PATCH, uri, Some(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, &body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, &body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, &body, Some(token))).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PATCH, uri, &body, Some(token))).await
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "rentora-test-boundary";

/// One part of a multipart form.
pub enum Part {
    Text(&'static str, String),
    File(&'static str, &'static str, Vec<u8>),
}

pub fn text(name: &'static str, value: impl Into<String>) -> Part {
    Part::Text(name, value.into())
}

pub fn file(name: &'static str, file_name: &'static str, data: Vec<u8>) -> Part {
    Part::File(name, file_name, data)
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; \
                         filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Send a multipart form with a bearer token.
pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    parts: &[Part],
    token: &str,
) -> Response<Body> {
    let request = builder(method, uri, Some(token))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}
