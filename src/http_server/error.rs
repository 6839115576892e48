//! Defines the custom `ApiError` type for the HTTP server.

use std::net::AddrParseError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use thiserror::Error;

/// A custom error type for the API that can be converted into an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Represents an unauthorized request.
    Unauthorized,

    /// Represents a resource that could not be found.
    NotFound(String),

    /// Represents a generic internal server error.
    InternalServerError(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

/// Implements the conversion from `ApiError` into an `axum` response.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::Unauthorized =>
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            ApiError::InternalServerError(err) => {
                tracing::error!("Internal server error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal server error occurred" }),
                )
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
        };

        (status, Json(body)).into_response()
    }
}

/// Errors that stop the HTTP server itself.
#[derive(Debug, Error)]
pub enum HttpServerError {
    /// The configured listen address is not a socket address.
    #[error("Invalid server.listen_address: {0}")]
    InvalidAddress(#[from] AddrParseError),

    /// Binding or serving failed.
    #[error("HTTP server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
