use quay_types::{millis_to_bytes, RecordId};

/// Domain tag prepended to every work hash computation. Prevents the work
/// hash from colliding with any other BLAKE3 use in the system.
const WORK_DOMAIN: &str = "quay-work-v1";

/// Compute the work hash for a record's content.
///
/// Two-stage: the value and timestamp are hashed first, then the salt is
/// folded in. A valid proof-of-work is a salt whose resulting hash carries
/// enough leading zero bits; the hash itself becomes the record's identity,
/// which binds the work to this exact value, time, and salt.
pub fn work_hash(value: &[u8], time_bytes: &[u8; 8], salt: &[u8]) -> [u8; 32] {
    let mut inner = blake3::Hasher::new();
    inner.update(WORK_DOMAIN.as_bytes());
    inner.update(b":");
    inner.update(value);
    inner.update(time_bytes);
    let load = inner.finalize();

    let mut outer = blake3::Hasher::new();
    outer.update(load.as_bytes());
    outer.update(salt);
    *outer.finalize().as_bytes()
}

/// Score a record's proof-of-work.
///
/// Returns `-1` if `work` does not match the hash recomputed from
/// `(value, time_bytes, salt)` — work computed for different content never
/// scores. Otherwise returns the number of leading zero bits of the work
/// hash (0..=256).
pub fn work_score(value: &[u8], time_bytes: &[u8; 8], salt: &[u8], work: &RecordId) -> i32 {
    let computed = work_hash(value, time_bytes, salt);
    if &computed != work.as_bytes() {
        return -1;
    }
    leading_zero_bits(&computed)
}

/// Returns `true` if the tuple verifies with at least `min_work` leading
/// zero bits.
pub fn verify(value: &[u8], time_bytes: &[u8; 8], salt: &[u8], work: &RecordId, min_work: i32) -> bool {
    work_score(value, time_bytes, salt, work) >= min_work
}

/// Search for a salt whose work hash reaches `difficulty` leading zero bits.
///
/// Returns the salt and the resulting identity. Intended for publishers and
/// tests; expected cost is `2^difficulty` hashes.
pub fn mine(value: &[u8], timestamp: i64, difficulty: i32) -> (Vec<u8>, RecordId) {
    use rand::RngCore;

    let time_bytes = millis_to_bytes(timestamp);
    let mut rng = rand::thread_rng();
    let mut salt = vec![0u8; 32];
    loop {
        rng.fill_bytes(&mut salt);
        let hash = work_hash(value, &time_bytes, &salt);
        if leading_zero_bits(&hash) >= difficulty {
            return (salt, RecordId::new(hash));
        }
    }
}

/// Work score of already-admitted work bytes: the leading zero bit count.
///
/// Used when ranking stored records for eviction, where the binding check
/// already happened at admission and rehashing every entry per sweep would
/// be wasted effort.
pub fn stored_score(work: &RecordId) -> i32 {
    leading_zero_bits(work.as_bytes())
}

fn leading_zero_bits(bytes: &[u8; 32]) -> i32 {
    let mut count = 0;
    for b in bytes {
        if *b == 0 {
            count += 8;
        } else {
            count += b.leading_zeros() as i32;
            break;
        }
    }
    count
}
