//! Deterministic user bucketing.
//!
//! The hash must stay bit-compatible with the web client, which folds the
//! identifier's UTF-16 code units with `hash = (hash << 5) - hash + unit`
//! truncated to a signed 32-bit integer after every step. Changing it moves
//! users in and out of running rollouts.

/// Size of the bucket space. Rollout percentages are expressed against it.
pub const BUCKETS: u32 = 100;

/// Base-31 rolling hash over UTF-16 code units with `i32` wraparound.
///
/// # Example
/// ```rust
/// use sf_flags::bucket::rollout_hash;
///
/// assert_eq!(rollout_hash(""), 0);
/// assert_eq!(rollout_hash("a"), 97);
/// assert_eq!(rollout_hash("user-42"), -147_182_656);
/// ```
#[must_use]
pub fn rollout_hash(id: &str) -> i32 {
    id.encode_utf16().fold(0_i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Maps an identifier to its bucket in `1..=100`.
///
/// `i32::MIN` has no positive counterpart in `i32`; its magnitude is taken as
/// `2_147_483_648`, which lands in bucket 49.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn rollout_bucket(id: &str) -> u8 {
    // Remainder is always below BUCKETS, so it fits in u8.
    (rollout_hash(id).unsigned_abs() % BUCKETS) as u8 + 1
}

/// Percentage decision for an enabled feature.
///
/// 100 includes everyone and 0 nobody. Anything in between needs a non-empty
/// identifier; anonymous callers are never part of a partial rollout.
#[must_use]
pub fn in_rollout(user_id: Option<&str>, percentage: u8) -> bool {
    match percentage {
        100 => true,
        0 => false,
        _ => user_id.filter(|id| !id.is_empty()).is_some_and(|id| rollout_bucket(id) <= percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(rollout_hash("bob"), 97_717);
        assert_eq!(rollout_hash("alice"), 92_903_040);
        assert_eq!(rollout_hash("user-1"), -836_031_825);
        assert_eq!(rollout_hash("teacher-17"), -1_193_426_959);
    }

    #[test]
    fn hash_uses_utf16_code_units() {
        // U+1F600 is the surrogate pair D83D DE00.
        assert_eq!(rollout_hash("😀"), 0xD83D * 31 + 0xDE00);
        assert_eq!(rollout_hash("école"), 218_239_822);
    }

    #[test]
    fn hash_wraps_to_i32_min() {
        assert_eq!(rollout_hash("polygenelubricants"), i32::MIN);
        assert_eq!(rollout_bucket("polygenelubricants"), 49);
    }

    #[test]
    fn colliding_ids_share_a_bucket() {
        assert_eq!(rollout_hash("Aa"), rollout_hash("BB"));
        assert_eq!(rollout_bucket("Aa"), 13);
        assert_eq!(rollout_bucket("BB"), 13);
    }

    #[test]
    fn bucket_edges() {
        assert_eq!(rollout_bucket(""), 1);
        assert_eq!(rollout_bucket("😀"), 100);
        assert_eq!(rollout_bucket("user-42"), 57);
    }

    #[test]
    fn rollout_extremes_ignore_identity() {
        assert!(in_rollout(None, 100));
        assert!(in_rollout(Some("anyone"), 100));
        assert!(!in_rollout(None, 0));
        assert!(!in_rollout(Some("anyone"), 0));
    }

    #[test]
    fn partial_rollout_excludes_anonymous_and_empty_ids() {
        assert!(!in_rollout(None, 99));
        // An empty id has bucket 1 but is still treated as anonymous.
        assert!(!in_rollout(Some(""), 99));
    }

    #[test]
    fn partial_rollout_compares_bucket_inclusively() {
        assert!(in_rollout(Some("user-42"), 57));
        assert!(!in_rollout(Some("user-42"), 56));
    }
}
