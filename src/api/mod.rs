//! REST API endpoints.
//!
//! Axum-based HTTP API serving the season leaderboard, head-to-head
//! comparison and single-game views as JSON chart specs.

pub mod routes;
pub mod state;

use axum::{
    extract::rejection::QueryRejection,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::compare::CompareError;
use crate::fetch::FetchError;
use crate::models::UnknownMetricError;
use crate::storage::StorageError;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CompareError> for ApiError {
    fn from(err: CompareError) -> Self {
        match err {
            CompareError::PlayerNotFound(_) => ApiError::NotFound(err.to_string()),
            CompareError::InvalidSelection(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<UnknownMetricError> for ApiError {
    fn from(err: UnknownMetricError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = match state.cors_origin.as_str() {
        "*" => CorsLayer::new().allow_origin(Any),
        origin => match HeaderValue::from_str(origin) {
            Ok(value) => CorsLayer::new().allow_origin(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                CorsLayer::new()
            }
        },
    };

    Router::new()
        .route("/api/season/filters", get(routes::season::filters))
        .route("/api/season/leaderboard", get(routes::season::leaderboard))
        .route("/api/season/compare", get(routes::season::compare))
        .route("/api/season/csv", get(routes::season::csv_download))
        .route("/api/games", get(routes::games::games_by_date))
        .route("/api/games/:game_id/boxscore", get(routes::games::boxscore))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_player_not_found_is_404() {
        let err: ApiError = CompareError::PlayerNotFound("Nobody".into()).into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Nobody"));
    }

    #[tokio::test]
    async fn test_invalid_selection_is_400() {
        let err: ApiError = CompareError::InvalidSelection("A".into()).into();
        let (status, _) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_metric_is_400() {
        let err: ApiError = UnknownMetricError("FOO".into()).into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_fetch_error_is_502() {
        let err: ApiError = FetchError::HttpStatus {
            status: 503,
            message: "Service Unavailable".into(),
        }
        .into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_storage_error_is_500() {
        let err: ApiError = StorageError::PathNotFound("/nope".into()).into();
        let (status, _) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
