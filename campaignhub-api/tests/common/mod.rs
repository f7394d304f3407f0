//! Common test utilities for the API integration tests
//!
//! - `lazy_app()` builds the router over a pool that never connects, for
//!   requests that are rejected before any query runs
//! - `TestContext::new()` builds the router over a real, migrated database
//!   and returns `None` when `DATABASE_URL` is not set
//! - Request and body helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use campaignhub_api::app::{build_router, AppState};
use campaignhub_api::config::{ApiConfig, Config, DatabaseSettings, LogFormat, LoggingConfig};
use campaignhub_shared::db::{migrations::run_migrations, pool::create_pool};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tower::Service as _;
use uuid::Uuid;

pub fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            production: false,
            request_timeout_secs: 10,
        },
        database: DatabaseSettings {
            url: database_url.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            run_migrations: true,
        },
        logging: LoggingConfig {
            format: LogFormat::Pretty,
        },
    }
}

/// Router over a pool pointing at a closed port
pub fn lazy_app() -> Router {
    let url = "postgresql://campaignhub@127.0.0.1:1/unreachable";
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy(url)
        .expect("lazy pool from a well-formed URL");

    build_router(AppState::new(pool, test_config(url)))
}

/// Test context backed by a real database
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping database-backed test");
            return None;
        };

        let config = test_config(&url);
        let db = create_pool(config.pool_config())
            .await
            .expect("Failed to connect to test database");
        run_migrations(&db).await.expect("Failed to run migrations");

        let app = build_router(AppState::new(db.clone(), config));
        Some(Self { db, app })
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(&self.app, request).await
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))
    };

    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}
