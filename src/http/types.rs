use axum::response::{IntoResponse, Response};
use ::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::error::ServiceError;
use crate::config::ConfigError;

/// JSON error body: every failure is `{"error": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody { pub error: String }

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    BadRequest(&'static str),

    #[error("authorization required")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{code}: {detail}")]
    Upstream { code: &'static str, detail: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{code}: {source:#}")]
    Store { code: &'static str, source: anyhow::Error },
}

impl ApiError {
    /// Map a service failure; `failure` is the code reported for store and upstream errors.
    pub fn from_service(err: ServiceError, failure: &'static str) -> Self {
        match err {
            ServiceError::Validation(code) => ApiError::BadRequest(code),
            ServiceError::Unauthorized => ApiError::Unauthorized,
            ServiceError::Upstream(detail) => ApiError::Upstream { code: failure, detail },
            ServiceError::Config(e) => ApiError::Config(e),
            ServiceError::Store(source) => ApiError::Store { code: failure, source },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::BadRequest(code) => (StatusCode::BAD_REQUEST, code.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found".to_string()),
            ApiError::Upstream { code, detail } => {
                tracing::warn!(error = %detail, "upstream failure");
                (StatusCode::BAD_GATEWAY, code.to_string())
            }
            ApiError::Config(e) => {
                tracing::error!(error = %e, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Store { code, source } => {
                tracing::error!(error = ?source, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, code.to_string())
            }
        };
        (status, axum::Json(ErrorBody { error })).into_response()
    }
}

/// Parses a `?id=` value; missing, non-numeric and zero all count as absent.
pub fn parse_id(raw: Option<&str>) -> Result<i64, ApiError> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|id| *id != 0)
        .ok_or(ApiError::BadRequest("id_required"))
}
