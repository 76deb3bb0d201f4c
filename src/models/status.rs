use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StatusLabel {
    Smooth,
    SomeWaiting,
    HeavyWaiting,
    Unknown,
}

impl StatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::Smooth => "smooth",
            StatusLabel::SomeWaiting => "some-waiting",
            StatusLabel::HeavyWaiting => "heavy-waiting",
            StatusLabel::Unknown => "unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StatusLabel::Smooth => "Visitors report little or no waiting right now",
            StatusLabel::SomeWaiting => "A few visitors are currently waiting",
            StatusLabel::HeavyWaiting => "Multiple visitors report long waiting",
            StatusLabel::Unknown => "Status updates appear when people are visiting",
        }
    }
}

/// Derived wait status for one clinic. Recomputed on every query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub label: StatusLabel,
    pub description: String,
    /// Empty whenever `label` is `Unknown`.
    pub confidence_note: String,
}

impl StatusResult {
    pub fn unknown() -> Self {
        Self {
            label: StatusLabel::Unknown,
            description: StatusLabel::Unknown.description().to_string(),
            confidence_note: String::new(),
        }
    }

    pub fn new(label: StatusLabel, confidence_note: String) -> Self {
        if label == StatusLabel::Unknown {
            return Self::unknown();
        }

        Self {
            label,
            description: label.description().to_string(),
            confidence_note,
        }
    }
}
