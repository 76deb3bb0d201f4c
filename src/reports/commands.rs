use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{
        models::{Report, WaitBucket},
        InsertOutcome,
    },
    display::StatusDisplay,
    models::{Clinic, StatusResult},
    reports::ReportError,
    status::{compute_status, engine::fresh_reports},
    AppState,
};

/// Raw submission as it arrives from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub clinic_id: Option<String>,
    pub wait_bucket: Option<String>,
}

/// Status view for one clinic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicStatus {
    pub clinic: Clinic,
    pub status: StatusResult,
    pub display: StatusDisplay,
    /// Fresh reports the status was derived from.
    pub report_count: usize,
}

/// Pseudonymous id for a reporting device that has none yet.
pub fn new_device_id() -> String {
    format!("device_{}", Uuid::new_v4().simple())
}

fn require_clinic<'a>(state: &'a AppState, clinic_id: Option<&str>) -> Result<&'a Clinic, ReportError> {
    let clinic_id = clinic_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ReportError::Validation("clinic_id is required".into()))?;

    state
        .clinics
        .resolve(clinic_id)
        .ok_or_else(|| ReportError::Validation(format!("unknown clinic '{clinic_id}'")))
}

fn require_bucket(wait_bucket: Option<&str>) -> Result<WaitBucket, ReportError> {
    let raw = wait_bucket
        .ok_or_else(|| ReportError::Validation("wait_bucket is required".into()))?;

    raw.parse::<WaitBucket>()
        .map_err(|_| ReportError::Validation(format!("invalid wait_bucket '{raw}'")))
}

fn require_device(device_id: &str) -> Result<&str, ReportError> {
    let device_id = device_id.trim();
    if device_id.is_empty() {
        return Err(ReportError::Validation("device id is required".into()));
    }
    Ok(device_id)
}

/// Validate and store a wait report.
///
/// `device_id` is supplied by the caller; the cooldown is keyed on it and the
/// clinic, and enforced atomically with the insert.
pub async fn submit_report(
    state: &AppState,
    request: SubmitReportRequest,
    device_id: &str,
) -> Result<Report, ReportError> {
    let clinic = require_clinic(state, request.clinic_id.as_deref())?;
    let wait_bucket = require_bucket(request.wait_bucket.as_deref())?;

    let device_id = require_device(device_id)?;

    let cooldown = state.settings.submission_config()?.cooldown;
    let now = state.clock.now();

    match state
        .db
        .insert_report_unless_recent(&clinic.id, wait_bucket, device_id, now, cooldown)
        .await?
    {
        InsertOutcome::Inserted(report) => {
            info!(
                "Created report {} for clinic {} ({})",
                report.id, report.clinic_id, report.wait_bucket
            );
            Ok(report)
        }
        InsertOutcome::Throttled { last_reported_at } => {
            warn!(
                "Rejected report for clinic {}: device reported at {}",
                clinic.id, last_reported_at
            );
            Err(ReportError::RateLimited {
                last_reported_at,
                retry_after: last_reported_at + cooldown - now,
            })
        }
    }
}

/// Reports that can still influence a clinic's status, newest first.
pub async fn get_recent_reports(state: &AppState, clinic_key: &str) -> Result<Vec<Report>, ReportError> {
    let clinic = require_clinic(state, Some(clinic_key))?;
    let window = state.settings.status_config()?.freshness_window;
    let since = state.clock.now() - window;

    let reports = state.db.list_recent_reports(&clinic.id, since).await?;
    info!(
        "Fetched {} recent reports for clinic {}",
        reports.len(),
        clinic.id
    );
    Ok(reports)
}

/// Current derived status for a clinic, by id or slug.
pub async fn get_clinic_status(state: &AppState, clinic_key: &str) -> Result<ClinicStatus, ReportError> {
    let clinic = require_clinic(state, Some(clinic_key))?;
    let config = state.settings.status_config()?;
    let now = state.clock.now();

    let reports = state
        .db
        .list_recent_reports(&clinic.id, now - config.freshness_window)
        .await?;

    let status = compute_status(&reports, now, &config);
    let report_count = fresh_reports(&reports, now, &config).len();

    info!(
        "Status for clinic {}: {} from {} fresh reports",
        clinic.id,
        status.label.as_str(),
        report_count
    );

    Ok(ClinicStatus {
        clinic: clinic.clone(),
        display: StatusDisplay::from(status.label),
        status,
        report_count,
    })
}

/// Whether this device is still inside its cooldown for the clinic.
/// Advisory only; `submit_report` re-checks atomically.
pub async fn has_recent_report(
    state: &AppState,
    clinic_key: &str,
    device_id: &str,
) -> Result<bool, ReportError> {
    let clinic = require_clinic(state, Some(clinic_key))?;
    let device_id = require_device(device_id)?;
    let cooldown = state.settings.submission_config()?.cooldown;
    let since = state.clock.now() - cooldown;

    let last = state
        .db
        .last_report_by_device(&clinic.id, device_id, since)
        .await?;
    Ok(last.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::TempDir;

    use crate::{
        clinics::ClinicDirectory, clock::ManualClock, db::Database, models::StatusLabel,
        settings::SettingsStore,
    };

    struct Harness {
        _dir: TempDir,
        clock: Arc<ManualClock>,
        state: AppState,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap()
    }

    fn harness() -> Harness {
        harness_with_settings(None)
    }

    fn harness_with_settings(settings_json: Option<&str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        if let Some(json) = settings_json {
            std::fs::write(dir.path().join("settings.json"), json).unwrap();
        }
        let db = Database::new(dir.path().join("reports.sqlite3")).unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let state = AppState::new(db, settings, ClinicDirectory::default(), clock.clone());
        Harness {
            _dir: dir,
            clock,
            state,
        }
    }

    fn request(clinic_id: &str, wait_bucket: &str) -> SubmitReportRequest {
        SubmitReportRequest {
            clinic_id: Some(clinic_id.into()),
            wait_bucket: Some(wait_bucket.into()),
        }
    }

    #[tokio::test]
    async fn rejects_missing_and_malformed_fields() {
        let h = harness();

        let missing_clinic = SubmitReportRequest {
            clinic_id: None,
            wait_bucket: Some("<15".into()),
        };
        assert!(matches!(
            submit_report(&h.state, missing_clinic, "device_a").await,
            Err(ReportError::Validation(_))
        ));

        let blank_clinic = request("  ", "<15");
        assert!(matches!(
            submit_report(&h.state, blank_clinic, "device_a").await,
            Err(ReportError::Validation(_))
        ));

        let missing_bucket = SubmitReportRequest {
            clinic_id: Some("1".into()),
            wait_bucket: None,
        };
        assert!(matches!(
            submit_report(&h.state, missing_bucket, "device_a").await,
            Err(ReportError::Validation(_))
        ));

        assert!(matches!(
            submit_report(&h.state, request("1", "45+"), "device_a").await,
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            submit_report(&h.state, request("99", "<15"), "device_a").await,
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            submit_report(&h.state, request("1", "<15"), "").await,
            Err(ReportError::Validation(_))
        ));

        assert!(get_recent_reports(&h.state, "1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_report_check_validates_device_id() {
        let h = harness();
        submit_report(&h.state, request("1", "<15"), "device_a")
            .await
            .unwrap();

        assert!(matches!(
            has_recent_report(&h.state, "1", "   ").await,
            Err(ReportError::Validation(_))
        ));
        assert!(has_recent_report(&h.state, "1", " device_a ").await.unwrap());
    }

    #[tokio::test]
    async fn created_at_comes_from_server_clock() {
        let h = harness();
        let report = submit_report(&h.state, request("1", "15-30"), "device_a")
            .await
            .unwrap();

        assert_eq!(report.created_at, start());
        assert_eq!(report.wait_bucket, WaitBucket::From15To30);
        assert_eq!(report.reporter_device_id.as_deref(), Some("device_a"));
    }

    #[tokio::test]
    async fn cooldown_rejects_then_allows() {
        let h = harness();

        submit_report(&h.state, request("1", "<15"), "device_a")
            .await
            .unwrap();

        h.clock.advance(Duration::minutes(10));
        match submit_report(&h.state, request("1", "30+"), "device_a").await {
            Err(ReportError::RateLimited {
                last_reported_at,
                retry_after,
            }) => {
                assert_eq!(last_reported_at, start());
                assert_eq!(retry_after, Duration::minutes(50));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert!(has_recent_report(&h.state, "1", "device_a").await.unwrap());

        h.clock.advance(Duration::minutes(51));
        assert!(!has_recent_report(&h.state, "1", "device_a").await.unwrap());
        submit_report(&h.state, request("1", "30+"), "device_a")
            .await
            .unwrap();

        assert_eq!(get_recent_reports(&h.state, "1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_cooldown_setting_keeps_gate_enabled() {
        let h = harness_with_settings(Some(r#"{"status": {"cooldown_minutes": -5}}"#));

        submit_report(&h.state, request("1", "<15"), "device_a")
            .await
            .unwrap();
        h.clock.advance(Duration::minutes(1));

        assert!(matches!(
            submit_report(&h.state, request("1", "<15"), "device_a").await,
            Err(ReportError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn status_needs_two_reports() {
        let h = harness();

        let status = get_clinic_status(&h.state, "apollo-clinic-whitefield")
            .await
            .unwrap();
        assert_eq!(status.status.label, StatusLabel::Unknown);
        assert_eq!(status.report_count, 0);

        submit_report(&h.state, request("1", "30+"), "device_a")
            .await
            .unwrap();
        let status = get_clinic_status(&h.state, "1").await.unwrap();
        assert_eq!(status.status.label, StatusLabel::Unknown);
        assert_eq!(status.display.emoji, "⚪");
        assert_eq!(status.report_count, 1);

        h.clock.advance(Duration::minutes(3));
        submit_report(&h.state, request("1", "Just arrived / <15 min"), "device_b")
            .await
            .unwrap();
        h.clock.advance(Duration::minutes(1));

        let status = get_clinic_status(&h.state, "1").await.unwrap();
        assert_eq!(status.status.label, StatusLabel::HeavyWaiting);
        assert_eq!(
            status.status.confidence_note,
            "Based on reports in the last 1 minute"
        );
        assert_eq!(status.display.text, "Heavy waiting reported");
        assert_eq!(status.report_count, 2);
        assert_eq!(status.clinic.id, "1");
    }

    #[tokio::test]
    async fn status_expires_with_freshness_window() {
        let h = harness();
        submit_report(&h.state, request("2", "<15"), "device_a")
            .await
            .unwrap();
        submit_report(&h.state, request("2", "<15"), "device_b")
            .await
            .unwrap();

        let status = get_clinic_status(&h.state, "2").await.unwrap();
        assert_eq!(status.status.label, StatusLabel::Smooth);

        h.clock.advance(Duration::minutes(90));
        let status = get_clinic_status(&h.state, "2").await.unwrap();
        assert_eq!(status.status.label, StatusLabel::Unknown);
        assert_eq!(status.status.confidence_note, "");
    }

    #[tokio::test]
    async fn unknown_clinic_query_is_validation_error() {
        let h = harness();
        let err = get_clinic_status(&h.state, "nowhere").await.unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn device_ids_are_unique() {
        let a = new_device_id();
        let b = new_device_id();
        assert!(a.starts_with("device_"));
        assert_ne!(a, b);
    }
}
