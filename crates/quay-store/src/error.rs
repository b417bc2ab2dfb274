use thiserror::Error;

use quay_crypto::AddressError;

/// Errors from cache store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The record's proof-of-work scored below the configured minimum.
    #[error("insufficient work: scored {score}, require {required}")]
    InsufficientWork { score: i32, required: i32 },

    /// Malformed identity bytes reached the addresser.
    #[error("address error: {0}")]
    Address(#[from] AddressError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
