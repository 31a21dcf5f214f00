use chrono::Duration;

/// Default validity window of a cached aggregate.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

/// Default age after which a served aggregate is refreshed in the background.
pub const DEFAULT_REFRESH_THRESHOLD_MINUTES: i64 = 15;

/// How far past `now` a stamp may lie and still be trusted. Covers clock
/// drift between the machine that wrote the aggregate and this one.
pub const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

/// Freshness rules for the cached aggregate.
///
/// All checks take `now` explicitly, in milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub validity: Duration,
    pub refresh_threshold: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            validity: Duration::minutes(DEFAULT_VALIDITY_MINUTES),
            refresh_threshold: Duration::minutes(DEFAULT_REFRESH_THRESHOLD_MINUTES),
        }
    }
}

impl CachePolicy {
    pub fn from_minutes(validity: i64, refresh_threshold: i64) -> Self {
        Self {
            validity: Duration::minutes(validity),
            refresh_threshold: Duration::minutes(refresh_threshold),
        }
    }

    /// A threshold at or past the validity window never fires.
    pub fn refreshes_in_background(&self) -> bool {
        self.refresh_threshold < self.validity
    }

    /// Age in milliseconds. Timestamps slightly in the future count as brand new.
    fn age_ms(last_updated: i64, now: i64) -> i64 {
        now.saturating_sub(last_updated).max(0)
    }

    /// A stamp further ahead of `now` than the allowed skew cannot be trusted.
    pub fn is_from_future(&self, last_updated: i64, now: i64) -> bool {
        let skew = Duration::minutes(MAX_CLOCK_SKEW_MINUTES);
        last_updated.saturating_sub(now) > skew.num_milliseconds()
    }

    pub fn is_valid(&self, last_updated: i64, now: i64) -> bool {
        !self.is_from_future(last_updated, now)
            && Self::age_ms(last_updated, now) < self.validity.num_milliseconds()
    }

    pub fn needs_background_refresh(&self, last_updated: i64, now: i64) -> bool {
        Self::age_ms(last_updated, now) > self.refresh_threshold.num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60 * 1000;
    const T: i64 = 1_700_000_000_000;

    #[test]
    fn test_validity_window_boundaries() {
        let policy = CachePolicy::default();
        assert!(policy.is_valid(T, T));
        assert!(policy.is_valid(T, T + 30 * MINUTE - 1));
        assert!(!policy.is_valid(T, T + 30 * MINUTE));
        assert!(!policy.is_valid(T, T + 31 * MINUTE));
    }

    #[test]
    fn test_refresh_threshold_is_exclusive() {
        let policy = CachePolicy::default();
        assert!(!policy.needs_background_refresh(T, T + 15 * MINUTE));
        assert!(policy.needs_background_refresh(T, T + 15 * MINUTE + 1));
        assert!(policy.needs_background_refresh(T, T + 29 * MINUTE));
    }

    #[test]
    fn test_small_skew_counts_as_fresh() {
        let policy = CachePolicy::default();
        assert!(policy.is_valid(T + 5 * MINUTE, T));
        assert!(!policy.needs_background_refresh(T + 5 * MINUTE, T));
        assert!(!policy.is_from_future(T + 5 * MINUTE, T));
    }

    #[test]
    fn test_far_future_stamp_is_never_valid() {
        let policy = CachePolicy::default();
        assert!(policy.is_from_future(T + 5 * MINUTE + 1, T));
        assert!(!policy.is_valid(T + 365 * 24 * 60 * MINUTE, T));
        assert!(!policy.is_valid(i64::MAX, T));
        assert!(!policy.is_valid(i64::MIN, T));
    }

    #[test]
    fn test_custom_policy() {
        let policy = CachePolicy::from_minutes(10, 10);
        assert!(!policy.refreshes_in_background());
        assert!(!policy.is_valid(T, T + 10 * MINUTE));
        assert!(CachePolicy::default().refreshes_in_background());
    }
}
