/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use campaignhub_api::{app::{build_router, AppState}, config::Config};
/// use campaignhub_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes,
};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use campaignhub_shared::services::Services;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each handler via Axum's `State` extractor; every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Business logic, one service per resource
    pub services: Services,

    /// Database connection pool (health checks)
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            services: Services::new(db.clone()),
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /health                                     GET    service + database health
/// /api/users[/]                               GET    list, POST create
/// /api/users/health                           GET
/// /api/users/:id                              GET
/// /api/users/:id/campaigns                    GET
/// /api/campaigns[/]                           POST   create
/// /api/campaigns/:id                          GET
/// /api/campaigns/:id/progress                 PATCH
/// /api/campaigns/:id/tasks                    GET    list, POST add
/// /api/campaigns/:id/tasks/:task_id/complete  POST
/// /api/waitlist[/]                            GET    list
/// /api/waitlist/join                          POST
/// /api/waitlist/stats                         GET
/// /api/waitlist/health                        GET
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, timeout body rendering, request
/// timeout, tracing.
/// Unmatched paths fall through to axum's empty 404.
pub fn build_router(state: AppState) -> Router {
    use routes::{campaigns, health, users, waitlist};

    let cors = if state.config.cors_permissive() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Collection roots are registered with and without the trailing slash
    let users_root = get(users::list_users).post(users::create_user);
    let campaigns_root = post(campaigns::create_campaign);
    let waitlist_root = get(waitlist::list_entries);

    Router::new()
        .route("/health", get(health::health_check))
        // Users
        .route("/api/users", users_root.clone())
        .route("/api/users/", users_root)
        .route("/api/users/health", get(users::health))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/campaigns", get(users::get_user_campaigns))
        // Campaigns
        .route("/api/campaigns", campaigns_root.clone())
        .route("/api/campaigns/", campaigns_root)
        .route("/api/campaigns/:id", get(campaigns::get_campaign))
        .route(
            "/api/campaigns/:id/progress",
            patch(campaigns::update_campaign_progress),
        )
        .route(
            "/api/campaigns/:id/tasks",
            get(campaigns::list_tasks).post(campaigns::add_task),
        )
        .route(
            "/api/campaigns/:id/tasks/:task_id/complete",
            post(campaigns::complete_task),
        )
        // Waitlist
        .route("/api/waitlist", waitlist_root.clone())
        .route("/api/waitlist/", waitlist_root)
        .route("/api/waitlist/join", post(waitlist::join_waitlist))
        .route("/api/waitlist/stats", get(waitlist::get_stats))
        .route("/api/waitlist/health", get(waitlist::health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(map_response(render_timeout))
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Gives the timeout layer's bare 408 the standard `{"error": ...}` body
///
/// No handler answers 408 itself, so every 408 here came from `TimeoutLayer`.
pub(crate) async fn render_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::RequestTimeout.into_response();
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::Service as _;

    async fn call(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn timed_router() -> Router {
        Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(TimeoutLayer::new(Duration::from_millis(10)))
            .layer(map_response(render_timeout))
    }

    #[tokio::test]
    async fn test_timed_out_request_has_error_body() {
        let (status, body) = call(&timed_router(), "/slow").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, serde_json::json!({"error": "Request timed out"}));
    }

    #[tokio::test]
    async fn test_fast_request_passes_through() {
        let app = timed_router();
        let request = Request::builder().uri("/fast").body(Body::empty()).unwrap();
        let response = app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"done");
    }
}
