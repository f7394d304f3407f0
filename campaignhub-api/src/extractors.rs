//! Extractors that reject with the API's `{"error": ...}` body instead of
//! axum's plain-text rejections.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// Message for a missing, empty or unparseable JSON body
pub const NO_DATA_PROVIDED: &str = "No data provided";

/// JSON body extractor
///
/// Any body rejection (missing content type, syntax error, wrong shape)
/// becomes 400 `No data provided`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!(%rejection, "Rejected request body");
                Err(ApiError::BadRequest(NO_DATA_PROVIDED.to_string()))
            }
        }
    }
}

/// Path parameter extractor
///
/// A segment that doesn't parse (e.g. a non-numeric id) becomes 400.
#[derive(Debug, Clone)]
pub struct PathParams<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParams(value)),
            Err(rejection) => {
                debug!(%rejection, "Rejected path parameters");
                Err(ApiError::BadRequest("Invalid id in path".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde_json::Value;
    use tower::Service as _;

    async fn echo(JsonBody(value): JsonBody<Value>) -> Json<Value> {
        Json(value)
    }

    async fn id(PathParams(id): PathParams<i64>) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .route("/items/:id", get(id))
    }

    async fn error_of(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_json_body_accepts_json() {
        let response = app()
            .call(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"a":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_json_body_rejections() {
        let requests = [
            // No body, no content type
            Request::builder()
                .method("POST")
                .uri("/echo")
                .body(Body::empty())
                .unwrap(),
            // Malformed JSON
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
            // Wrong content type
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from(r#"{"a":1}"#))
                .unwrap(),
        ];

        for request in requests {
            let response = app().call(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_of(response).await, NO_DATA_PROVIDED);
        }
    }

    #[tokio::test]
    async fn test_path_params() {
        let ok = app()
            .call(Request::builder().uri("/items/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let bad = app()
            .call(Request::builder().uri("/items/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(bad).await, "Invalid id in path");
    }
}
