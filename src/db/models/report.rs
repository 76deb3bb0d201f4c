//! Wait report data models.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse wait duration a reporter selects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WaitBucket {
    #[serde(rename = "<15")]
    Under15,
    #[serde(rename = "15-30")]
    From15To30,
    #[serde(rename = "30+")]
    Over30,
}

impl WaitBucket {
    pub const ALL: [WaitBucket; 3] = [WaitBucket::Under15, WaitBucket::From15To30, WaitBucket::Over30];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaitBucket::Under15 => "<15",
            WaitBucket::From15To30 => "15-30",
            WaitBucket::Over30 => "30+",
        }
    }
}

impl fmt::Display for WaitBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitBucket {
    type Err = anyhow::Error;

    /// Accepts the stored values as well as the labels shown on the report form.
    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "<15" | "Just arrived / <15 min" => Ok(WaitBucket::Under15),
            "15-30" | "15–30 min" | "15-30 min" => Ok(WaitBucket::From15To30),
            "30+" | "30+ min" => Ok(WaitBucket::Over30),
            other => Err(anyhow!("unknown wait bucket '{other}'")),
        }
    }
}

/// A single anonymous wait report. Never updated once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub clinic_id: String,
    pub wait_bucket: WaitBucket,
    /// Only used by the submission cooldown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_device_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_values_and_form_labels() {
        assert_eq!("<15".parse::<WaitBucket>().unwrap(), WaitBucket::Under15);
        assert_eq!(
            "Just arrived / <15 min".parse::<WaitBucket>().unwrap(),
            WaitBucket::Under15
        );
        assert_eq!("15–30 min".parse::<WaitBucket>().unwrap(), WaitBucket::From15To30);
        assert_eq!(" 30+ ".parse::<WaitBucket>().unwrap(), WaitBucket::Over30);
    }

    #[test]
    fn rejects_unknown_bucket() {
        assert!("45".parse::<WaitBucket>().is_err());
        assert!("".parse::<WaitBucket>().is_err());
        assert!("UNDER_15".parse::<WaitBucket>().is_err());
    }

    #[test]
    fn serializes_with_stored_values() {
        let json = serde_json::to_string(&WaitBucket::From15To30).unwrap();
        assert_eq!(json, "\"15-30\"");
        let parsed: WaitBucket = serde_json::from_str("\"30+\"").unwrap();
        assert_eq!(parsed, WaitBucket::Over30);
    }
}
