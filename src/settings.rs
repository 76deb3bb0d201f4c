use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::status::StatusConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusSettings {
    pub freshness_window_minutes: i64,
    pub cooldown_minutes: i64,
}

const DEFAULT_FRESHNESS_WINDOW_MINUTES: i64 = 90;
const DEFAULT_COOLDOWN_MINUTES: i64 = 60;

/// Upper bound for either window; keeps `now - window` well inside chrono's range.
const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            freshness_window_minutes: DEFAULT_FRESHNESS_WINDOW_MINUTES,
            cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
        }
    }
}

fn checked_minutes(value: i64, default: i64, field: &str) -> i64 {
    match Duration::try_minutes(value) {
        Some(_) if value > 0 && value <= MAX_WINDOW_MINUTES => value,
        _ => {
            warn!("Ignoring {field} = {value}; must be 1..={MAX_WINDOW_MINUTES}, using {default}");
            default
        }
    }
}

impl StatusSettings {
    /// Replace non-positive or out-of-range windows with the defaults.
    fn sanitized(self) -> Self {
        Self {
            freshness_window_minutes: checked_minutes(
                self.freshness_window_minutes,
                DEFAULT_FRESHNESS_WINDOW_MINUTES,
                "freshness_window_minutes",
            ),
            cooldown_minutes: checked_minutes(
                self.cooldown_minutes,
                DEFAULT_COOLDOWN_MINUTES,
                "cooldown_minutes",
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    status: StatusSettings,
    /// Pseudonymous id for this installation, created on first report.
    device_id: Option<String>,
}

/// Cooldown applied to repeat submissions from one device for one clinic.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub cooldown: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(60),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data: UserSettings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };
        data.status = data.status.sanitized();

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn status(&self) -> Result<StatusSettings> {
        Ok(self.read()?.status.clone())
    }

    pub fn status_config(&self) -> Result<StatusConfig> {
        let minutes = self.status()?.freshness_window_minutes;
        Ok(StatusConfig::with_freshness_minutes(minutes))
    }

    pub fn submission_config(&self) -> Result<SubmissionConfig> {
        Ok(SubmissionConfig {
            cooldown: Duration::minutes(self.status()?.cooldown_minutes),
        })
    }

    /// Store new windows. Invalid values are replaced by the defaults
    /// before they are persisted.
    pub fn update_status(&self, settings: StatusSettings) -> Result<StatusSettings> {
        let settings = settings.sanitized();
        let mut guard = self.write()?;
        guard.status = settings.clone();
        self.persist(&guard)?;
        Ok(settings)
    }

    pub fn device_id(&self) -> Result<Option<String>> {
        Ok(self.read()?.device_id.clone())
    }

    /// Return the stored device id, creating and persisting one with
    /// `generate` if none exists yet.
    pub fn ensure_device_id(&self, generate: impl FnOnce() -> String) -> Result<String> {
        let mut guard = self.write()?;
        if let Some(existing) = guard.device_id.clone() {
            return Ok(existing);
        }

        let device_id = generate();
        guard.device_id = Some(device_id.clone());
        self.persist(&guard)?;
        Ok(device_id)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, UserSettings>> {
        self.data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, UserSettings>> {
        self.data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
