use chrono::{DateTime, Utc};

use crate::db::models::Report;

/// Render the recency qualifier for a set of fresh reports.
/// Returns an empty string when there is nothing to base it on.
pub fn confidence_note(fresh: &[&Report], now: DateTime<Utc>) -> String {
    let Some(newest) = fresh.iter().map(|r| r.created_at).max() else {
        return String::new();
    };

    // Server-assigned timestamps should never be ahead of `now`; clamp if they are.
    let minutes_ago = (now - newest).num_minutes().max(0);

    format!(
        "Based on reports in the last {} minute{}",
        minutes_ago,
        if minutes_ago == 1 { "" } else { "s" }
    )
}
