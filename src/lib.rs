pub mod clinics;
pub mod clock;
pub mod db;
pub mod display;
pub mod models;
pub mod reports;
pub mod settings;
pub mod status;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use clinics::ClinicDirectory;
use clock::{Clock, SystemClock};
use db::Database;
use reports::{
    get_clinic_status, get_recent_reports, new_device_id, submit_report, SubmitReportRequest,
};
use settings::{SettingsStore, StatusSettings};

const USAGE: &str = "usage:
  rightnow clinics
  rightnow status <clinic-id|slug>
  rightnow reports <clinic-id|slug>
  rightnow report <clinic-id> <wait-bucket>   (wait-bucket: <15 | 15-30 | 30+)
  rightnow settings [<freshness-minutes> <cooldown-minutes>]";

pub struct AppState {
    pub db: Database,
    pub settings: SettingsStore,
    pub clinics: ClinicDirectory,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        db: Database,
        settings: SettingsStore,
        clinics: ClinicDirectory,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            settings,
            clinics,
            clock,
        }
    }

    /// Open the store and settings under `data_dir` with the system clock.
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let database = Database::new(data_dir.join("rightnow.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        Ok(Self::new(
            database,
            settings,
            ClinicDirectory::default(),
            Arc::new(SystemClock),
        ))
    }
}

fn data_dir() -> PathBuf {
    std::env::var_os("RIGHTNOW_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("rightnow-data"))
}

fn parse_minutes(value: &str, field: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .with_context(|| format!("{field} must be a whole number of minutes"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("{USAGE}");
    };

    let state = AppState::open(data_dir())?;

    match (command.as_str(), &args[1..]) {
        ("clinics", []) => print_json(&state.clinics.all()),
        ("status", [clinic]) => print_json(&get_clinic_status(&state, clinic).await?),
        ("reports", [clinic]) => print_json(&get_recent_reports(&state, clinic).await?),
        ("report", [clinic_id, wait_bucket]) => {
            // The device id lives with the caller; the boundary only receives it.
            let device_id = state.settings.ensure_device_id(new_device_id)?;
            let request = SubmitReportRequest {
                clinic_id: Some(clinic_id.clone()),
                wait_bucket: Some(wait_bucket.clone()),
            };
            let report = submit_report(&state, request, &device_id).await?;
            print_json(&report)
        }
        ("settings", []) => print_json(&state.settings.status()?),
        ("settings", [freshness, cooldown]) => {
            let stored = state.settings.update_status(StatusSettings {
                freshness_window_minutes: parse_minutes(freshness, "freshness-minutes")?,
                cooldown_minutes: parse_minutes(cooldown, "cooldown-minutes")?,
            })?;
            print_json(&stored)
        }
        _ => bail!("{USAGE}"),
    }
}
