//! Logarithmic age buckets
//!
//! Bucket `k` covers ages in `[(2^k - 1) * I, (2^(k+1) - 1) * I)` where `I`
//! is the expected interval. Bucket 0 is one interval wide, bucket 1 two,
//! bucket 2 four, and so on.

/// Bucket index for a backup of the given age
///
/// Equivalent to `floor(log2(1 + age / interval))`. Integer division is
/// exact here: the bucket boundaries fall on whole multiples of the interval.
pub fn bucket_index(age_secs: u64, interval_secs: u64) -> u32 {
    debug_assert!(interval_secs > 0, "interval must be positive");
    (1 + age_secs / interval_secs.max(1)).ilog2()
}

/// Age range `[start, end)` in seconds covered by `bucket`
///
/// Saturates at `u64::MAX` for absurdly deep buckets.
pub fn bucket_bounds_secs(bucket: u32, interval_secs: u64) -> (u64, u64) {
    let units = |k: u32| 1u64.checked_shl(k).map_or(u64::MAX, |v| v - 1);
    let start = units(bucket).saturating_mul(interval_secs);
    let end = units(bucket.saturating_add(1)).saturating_mul(interval_secs);
    (start, end)
}
