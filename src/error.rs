use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// DataError
///
/// Everything that can go wrong between a repository call and the remote query
/// service. Callers never branch on the variant; it only feeds the logs.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("query service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("query service payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("query service returned no row")]
    MissingRow,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("presigning failed: {0}")]
    Presign(String),

    #[error("unsupported media type: {0}")]
    UnsupportedType(String),

    #[error("declared size {size} exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

/// ErrorBody
///
/// JSON body of every failed API response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

/// ApiError
///
/// The single failure category exposed by the API: a generic message and a 500.
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
}

impl ApiError {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// OrFail
///
/// Collapses any error into an `ApiError`, logging the underlying cause first.
pub trait OrFail<T> {
    fn or_fail(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> OrFail<T> for Result<T, E> {
    fn or_fail(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", message);
            ApiError::new(message)
        })
    }
}
