//! A centralized and idiomatic error handling module for the Axum web
//! application.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::config::ConfigError;
use super::session::SessionError;
use super::store::StoreError;
use super::supabase::GoTrueError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Validation failed")]
    ValidationStr(String),

    #[error("Invalid request format: {0}")]
    RequestFormat(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Internal Libraries
    #[error("Config operation failed")]
    Config(#[from] ConfigError),

    #[error("Session verification failed")]
    Session(#[from] SessionError),

    #[error("Auth provider operation failed")]
    GoTrue(#[from] GoTrueError),

    #[error("Store operation failed")]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

fn internal() -> (StatusCode, String, Option<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "An internal server error occurred".to_string(),
        None,
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Validation(err) => {
                let details = json!(err.field_errors());
                (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed".to_string(), Some(details))
            },
            AppError::RequestFormat(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::ValidationStr(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),

            // Internal Libraries
            AppError::Config(err) => {
                tracing::error!("Config getter error: {:?}", err);
                internal()
            },
            AppError::Session(err) => (StatusCode::UNAUTHORIZED, err.to_string(), None),
            AppError::GoTrue(err) => match err {
                GoTrueError::Rejected { status: 400 | 401 | 403, message } => {
                    tracing::warn!("Auth server rejected credentials: {}", message);
                    (StatusCode::UNAUTHORIZED, message, None)
                },
                GoTrueError::Rejected { status: 429, message } => {
                    tracing::warn!("Auth server rate limited request: {}", message);
                    (StatusCode::TOO_MANY_REQUESTS, message, None)
                },
                GoTrueError::Rejected { status, message } if (400..500).contains(&status) => {
                    tracing::warn!("Auth server rejected request ({}): {}", status, message);
                    (StatusCode::UNPROCESSABLE_ENTITY, message, None)
                },
                GoTrueError::Rejected { .. } | GoTrueError::HttpClient(_) | GoTrueError::ResponseParse => {
                    tracing::error!("Auth server error: {:?}", err);
                    (StatusCode::BAD_GATEWAY, "Auth provider unavailable".to_string(), None)
                },
                GoTrueError::InvalidUrl(_) => {
                    tracing::error!("Auth server URL error: {:?}", err);
                    internal()
                },
            },
            AppError::Store(err) => match err {
                StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
                StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
                StoreError::Transient(msg) => {
                    tracing::warn!("Store unavailable: {}", msg);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Service temporarily unavailable, try again later".to_string(),
                        None,
                    )
                },
                StoreError::Fatal(msg) => {
                    tracing::error!("Store error: {}", msg);
                    internal()
                },
            },
        };

        (status, Json(ErrorResponse { message, details })).into_response()
    }
}
