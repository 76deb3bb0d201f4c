use chrono::Duration;

/// Tunable windows and thresholds for status derivation.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Reports at least this old are ignored entirely
    pub freshness_window: Duration,

    /// Fewer fresh reports than this always yields Unknown
    pub quorum: usize,

    /// Share of fresh reports a bucket needs to win (inclusive)
    pub majority_ratio: f64,
}

impl StatusConfig {
    pub fn with_freshness_minutes(minutes: i64) -> Self {
        Self {
            freshness_window: Duration::minutes(minutes),
            ..Self::default()
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::minutes(90),
            quorum: 2,
            majority_ratio: 0.5,
        }
    }
}
