use std::time::Duration;

use thiserror::Error;

use quay_types::RecordId;

/// Errors from engine interactions outside the fetch protocol.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("network engine channel closed")]
    EngineClosed,

    #[error("submit timed out after {0:?}")]
    SubmitTimeout(Duration),

    #[error("submit failed: {0}")]
    SubmitFailed(String),
}

/// Result alias for engine operations.
pub type NetResult<T> = Result<T, NetError>;

/// Errors from a chain fetch.
///
/// `NotFound` and `Timeout` are distinct, expected outcomes: the former
/// means the network produced nothing for a requested fragment, the latter
/// that the overall deadline expired mid-walk.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No response arrived for a requested fragment, even after a re-send.
    #[error("no response for fragment {0}")]
    NotFound(RecordId),

    /// The overall fetch deadline expired.
    #[error("chain fetch timed out")]
    Timeout,

    /// A fragment failed proof-of-work verification. The whole fetch is
    /// aborted; partial data is never delivered as success.
    #[error("fragment {id} has insufficient work: scored {score}, require {required}")]
    InsufficientWork {
        id: RecordId,
        score: i32,
        required: i32,
    },

    /// The engine closed its side of the channel pair.
    #[error("network engine channel closed")]
    EngineClosed,
}
