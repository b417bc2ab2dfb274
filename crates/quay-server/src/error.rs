use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use quay_net::FetchError;
use quay_store::StoreError;

/// Errors from gateway assembly and serving.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Request-level errors, mapped onto HTTP status codes.
///
/// Not-found and timeout are expected outcomes, not server faults; they
/// are reported to the caller and never logged as errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("chain fetch timed out")]
    GatewayTimeout,

    #[error("upstream engine error: {0}")]
    BadGateway(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientWork { .. } => Self::BadRequest(err.to_string()),
            // Malformed identity bytes reaching the addresser is a server
            // fault, not a client error.
            StoreError::Address(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout => Self::GatewayTimeout,
            // A poisoned or missing chain is never served as success.
            FetchError::NotFound(_) | FetchError::InsufficientWork { .. } => Self::NotFound,
            FetchError::EngineClosed => Self::BadGateway(err.to_string()),
        }
    }
}
