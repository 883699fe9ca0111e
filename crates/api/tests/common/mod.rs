#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;

use gallery_api::auth::token::{TokenClaims, TokenSettings};
use gallery_api::config::{ServerConfig, StorageConfig};
use gallery_api::router::build_app_router;
use gallery_api::state::AppState;
use gallery_core::roles::Role;
use gallery_core::storage::LocalBlobStorage;
use gallery_core::types::DbId;
use gallery_db::models::user::CreateUser;
use gallery_db::repositories::UserRepo;

pub const STORAGE_BASE: &str = "https://cdn.example.com/gallery";

const TOKEN_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

fn token_settings() -> TokenSettings {
    TokenSettings {
        secret: TOKEN_SECRET.to_string(),
        issuer: None,
        leeway_secs: 60,
    }
}

/// Build a test `ServerConfig` with safe defaults and the given media root.
pub fn test_config(media_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        token: token_settings(),
        storage: StorageConfig {
            storage_url: "https://cdn.example.com".to_string(),
            bucket_name: "gallery".to_string(),
            media_root: media_root.to_path_buf(),
            user_media_prefix: "icosa/".to_string(),
            archive_prefix: "https://web.archive.org/web/".to_string(),
        },
    }
}

/// Build the full application with local storage rooted at `media_root`.
pub fn build_test_app_with_media(pool: PgPool, media_root: &Path) -> Router {
    let config = test_config(media_root);
    let catalog = config.storage.catalog_config();
    let storage = LocalBlobStorage::new(media_root, &catalog.storage_base_url);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog: Arc::new(catalog),
        storage: Arc::new(storage),
    };

    build_app_router(state, &config)
}

/// Build the full application for tests that never touch stored media.
pub fn build_test_app(pool: PgPool) -> Router {
    let media_root = std::env::temp_dir().join("gallery-api-tests-no-media");
    build_test_app_with_media(pool, &media_root)
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Insert a user and return its id.
pub async fn create_user(pool: &PgPool, url: &str, display_name: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            url: url.to_string(),
            display_name: display_name.to_string(),
            email: None,
        },
    )
    .await
    .expect("user creation should succeed")
    .id
}

/// Sign a token the way the account service would.
fn sign_token(user_id: DbId, role: Role) -> String {
    let claims = TokenClaims {
        sub: user_id,
        role: role.to_string(),
        exp: chrono::Utc::now().timestamp() + 15 * 60,
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TOKEN_SECRET.as_bytes()),
    )
    .expect("token should encode")
}

pub fn user_token(user_id: DbId) -> String {
    sign_token(user_id, Role::User)
}

pub fn admin_token(user_id: DbId) -> String {
    sign_token(user_id, Role::Admin)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_anon(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
