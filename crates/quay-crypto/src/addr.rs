use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use quay_types::{CacheAddress, RecordId};

/// Errors from address derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The identity bytes are not the required 32-byte width.
    #[error("identity must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Derive the cache location for raw identity bytes.
///
/// The 32-byte identity is split into two 16-byte halves, each hashed
/// independently to a 64-bit key. Shorter or longer input is a caller
/// error. Deterministic, single pass, non-cryptographic.
pub fn derive_address(identity: &[u8]) -> Result<CacheAddress, AddressError> {
    if identity.len() != 32 {
        return Err(AddressError::InvalidLength(identity.len()));
    }
    Ok(CacheAddress::new(
        xxh3_64(&identity[..16]),
        xxh3_64(&identity[16..]),
    ))
}

/// Cache location of a typed identity. Infallible: a [`RecordId`] is
/// always 32 bytes.
pub fn address_of(id: &RecordId) -> CacheAddress {
    let bytes = id.as_bytes();
    CacheAddress::new(xxh3_64(&bytes[..16]), xxh3_64(&bytes[16..]))
}
