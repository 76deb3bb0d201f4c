use std::sync::{Arc, Once};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use rightnow_lib::{
    clinics::ClinicDirectory, clock::ManualClock, db::Database, settings::SettingsStore, AppState,
};

static INIT: Once = Once::new();

/// Initialize logging once for integration tests.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .is_test(true)
            .try_init();
    });
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 17, 0, 0).unwrap()
}

/// App state backed by a throwaway data directory and a manual clock.
pub struct TestApp {
    _dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub state: Arc<AppState>,
}

pub fn test_app() -> TestApp {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(dir.path().join("rightnow.sqlite3")).expect("database");
    let settings = SettingsStore::new(dir.path().join("settings.json")).expect("settings");
    let clock = Arc::new(ManualClock::new(start_time()));
    let state = AppState::new(db, settings, ClinicDirectory::default(), clock.clone());

    TestApp {
        _dir: dir,
        clock,
        state: Arc::new(state),
    }
}
