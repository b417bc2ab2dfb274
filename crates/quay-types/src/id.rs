use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of a stored record.
///
/// A `RecordId` is the record's 32-byte proof-of-work output. Because the
/// work hash is computed over the record's content, time, and salt, the
/// identity is content-addressed: identical submissions always produce the
/// same `RecordId`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId([u8; 32]);

impl RecordId {
    /// Wrap a pre-computed 32-byte identity.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse an identity from a byte slice. Exactly 32 bytes are required.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// The raw 32-byte identity.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string. Exactly 64 hex characters are required.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.short_hex())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for RecordId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<RecordId> for [u8; 32] {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// Location of a record within the two-level cache map.
///
/// Derived deterministically from a [`RecordId`] by the addresser in
/// `quay-crypto`. The shard/slot split bounds per-bucket size; it carries
/// no semantic meaning beyond that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheAddress {
    /// Outer map key, derived from the first half of the identity bytes.
    pub shard: u64,
    /// Inner map key, derived from the second half of the identity bytes.
    pub slot: u64,
}

impl CacheAddress {
    pub const fn new(shard: u64, slot: u64) -> Self {
        Self { shard, slot }
    }
}

impl fmt::Display for CacheAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}:{:016x}", self.shard, self.slot)
    }
}
