use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KindredError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing trait snapshot: {0}")]
    MissingTraits(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for KindredError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            KindredError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            KindredError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            KindredError::InvalidConfiguration(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            KindredError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KindredError::MissingTraits(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            KindredError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            KindredError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            KindredError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, KindredError>;
