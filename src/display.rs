//! Maps a status label to what a visitor sees.

use serde::Serialize;

use crate::models::StatusLabel;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusColors {
    pub bg: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusDisplay {
    pub emoji: &'static str,
    pub text: &'static str,
    pub colors: StatusColors,
}

impl From<StatusLabel> for StatusDisplay {
    fn from(label: StatusLabel) -> Self {
        Self {
            emoji: status_emoji(label),
            text: status_text(label),
            colors: status_colors(label),
        }
    }
}

pub fn status_emoji(label: StatusLabel) -> &'static str {
    match label {
        StatusLabel::Smooth => "🟢",
        StatusLabel::SomeWaiting => "🟡",
        StatusLabel::HeavyWaiting => "🔴",
        StatusLabel::Unknown => "⚪",
    }
}

pub fn status_text(label: StatusLabel) -> &'static str {
    match label {
        StatusLabel::Smooth => "Moving smoothly",
        StatusLabel::SomeWaiting => "Some waiting reported",
        StatusLabel::HeavyWaiting => "Heavy waiting reported",
        StatusLabel::Unknown => "No one has shared an update recently",
    }
}

pub fn status_colors(label: StatusLabel) -> StatusColors {
    match label {
        StatusLabel::Smooth => StatusColors {
            bg: "#ECFDF3",
            text: "#027A48",
        },
        StatusLabel::SomeWaiting => StatusColors {
            bg: "#FFFAEB",
            text: "#B54708",
        },
        StatusLabel::HeavyWaiting => StatusColors {
            bg: "#FEF3F2",
            text: "#B42318",
        },
        StatusLabel::Unknown => StatusColors {
            bg: "#F9FAFB",
            text: "#667085",
        },
    }
}
