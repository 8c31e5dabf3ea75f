use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Failed to fetch feed: {0}")]
    Fetch(String),

    #[error("Error parsing feed: {0}")]
    Parse(String),

    #[error("Failed to write CSV: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Every failure reaches the caller as the same opaque 500; the detail only
/// goes to the server log.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        response::error(StatusCode::INTERNAL_SERVER_ERROR).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<roxmltree::Error> for AppError {
    fn from(err: roxmltree::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
