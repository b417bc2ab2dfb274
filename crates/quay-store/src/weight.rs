/// Eviction weight of a record.
///
/// Combines proof-of-work score and age into a single scalar used to rank
/// records under capacity pressure. The exact decay curve is a tunable;
/// what the pruner relies on is the shape:
///
/// - for a fixed age, weight is strictly increasing in score (score ≥ 0);
/// - for a fixed score, weight never increases as age grows.
///
/// Negative scores (records that never verified) clamp to zero weight, so
/// they are always the first to go.
pub fn weight(score: i32, timestamp: i64, now: i64) -> f64 {
    if score <= 0 {
        return 0.0;
    }
    let age_millis = (now - timestamp).max(0) as f64;
    score as f64 / (1.0 + age_millis)
}
