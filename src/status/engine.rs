use chrono::{DateTime, Utc};

use crate::db::models::{Report, WaitBucket};
use crate::models::{StatusLabel, StatusResult};
use crate::status::{config::StatusConfig, confidence::confidence_note};

/// Per-bucket counts over the fresh reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketTally {
    /// Under 15 minutes
    pub green: usize,
    /// 15 to 30 minutes
    pub yellow: usize,
    /// Over 30 minutes
    pub red: usize,
}

impl BucketTally {
    pub fn from_reports(reports: &[&Report]) -> Self {
        let mut tally = Self::default();
        for report in reports {
            match report.wait_bucket {
                WaitBucket::Under15 => tally.green += 1,
                WaitBucket::From15To30 => tally.yellow += 1,
                WaitBucket::Over30 => tally.red += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.green + self.yellow + self.red
    }
}

/// Derive the current wait status from one clinic's reports.
///
/// `reports` must already be restricted to a single clinic. Every input,
/// including an empty slice, produces a well-formed result.
pub fn compute_status(
    reports: &[Report],
    now: DateTime<Utc>,
    config: &StatusConfig,
) -> StatusResult {
    // Step 1: drop anything outside the freshness window
    let fresh = fresh_reports(reports, now, config);

    // Step 2: a lone report never moves the status
    if fresh.len() < config.quorum.max(1) {
        return StatusResult::unknown();
    }

    // Step 3: tally buckets
    let tally = BucketTally::from_reports(&fresh);

    // Step 4: majority decision, worst bucket first
    let label = decide_label(&tally, config.majority_ratio);
    if label == StatusLabel::Unknown {
        return StatusResult::unknown();
    }

    // Step 5: recency qualifier
    StatusResult::new(label, confidence_note(&fresh, now))
}

/// Reports with `now - created_at` strictly inside the window.
pub fn fresh_reports<'a>(
    reports: &'a [Report],
    now: DateTime<Utc>,
    config: &StatusConfig,
) -> Vec<&'a Report> {
    reports
        .iter()
        .filter(|r| now - r.created_at < config.freshness_window)
        .collect()
}

/// Red is checked before yellow before green, so an exact tie between two
/// buckets resolves toward the longer wait. When no bucket reaches the
/// ratio the result is SomeWaiting.
pub fn decide_label(tally: &BucketTally, majority_ratio: f64) -> StatusLabel {
    let total = tally.total();
    if total == 0 {
        return StatusLabel::Unknown;
    }

    let reaches = |count: usize| count as f64 / total as f64 >= majority_ratio;

    if reaches(tally.red) {
        StatusLabel::HeavyWaiting
    } else if reaches(tally.yellow) {
        StatusLabel::SomeWaiting
    } else if reaches(tally.green) {
        StatusLabel::Smooth
    } else {
        StatusLabel::SomeWaiting
    }
}
