use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix milliseconds.
pub fn unix_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Big-endian 8-byte encoding of a millisecond timestamp.
///
/// This is the byte form bound into a record's proof-of-work hash, so it
/// must be stable across implementations.
pub fn millis_to_bytes(millis: i64) -> [u8; 8] {
    millis.to_be_bytes()
}

/// Inverse of [`millis_to_bytes`].
pub fn millis_from_bytes(bytes: [u8; 8]) -> i64 {
    i64::from_be_bytes(bytes)
}
