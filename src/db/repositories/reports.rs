use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    helpers::{format_datetime, parse_datetime, parse_wait_bucket},
    models::{Report, WaitBucket},
    Database,
};

/// Result of a cooldown-guarded insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Report),
    /// The device already reported for this clinic inside the cooldown.
    Throttled { last_reported_at: DateTime<Utc> },
}

fn row_to_report(row: &Row) -> Result<Report> {
    let wait_bucket: String = row.get("wait_bucket")?;
    let created_at: String = row.get("created_at")?;

    Ok(Report {
        id: row.get("id")?,
        clinic_id: row.get("clinic_id")?,
        wait_bucket: parse_wait_bucket(&wait_bucket)?,
        reporter_device_id: row.get("reporter_device_id")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn new_report(
    clinic_id: String,
    wait_bucket: WaitBucket,
    reporter_device_id: Option<String>,
    created_at: DateTime<Utc>,
) -> Report {
    Report {
        id: Uuid::new_v4().to_string(),
        clinic_id,
        wait_bucket,
        reporter_device_id,
        // Match the precision the row is stored with.
        created_at: created_at.trunc_subsecs(6),
    }
}

fn insert_row(conn: &Connection, report: &Report) -> Result<()> {
    conn.execute(
        "INSERT INTO reports (id, clinic_id, wait_bucket, reporter_device_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            report.id,
            report.clinic_id,
            report.wait_bucket.as_str(),
            report.reporter_device_id,
            format_datetime(report.created_at),
        ],
    )
    .with_context(|| "failed to insert report")?;
    Ok(())
}

/// Newest report from this device for this clinic strictly after `since`.
fn latest_for_device(
    conn: &Connection,
    clinic_id: &str,
    device_id: &str,
    since: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    let latest: Option<String> = conn
        .query_row(
            "SELECT created_at FROM reports
             WHERE clinic_id = ?1 AND reporter_device_id = ?2 AND created_at > ?3
             ORDER BY created_at DESC
             LIMIT 1",
            params![clinic_id, device_id, format_datetime(since)],
            |row| row.get(0),
        )
        .optional()?;

    latest
        .map(|raw| parse_datetime(&raw, "created_at"))
        .transpose()
}

impl Database {
    /// Append a report. `created_at` comes from the server clock, never the reporter.
    pub async fn insert_report(
        &self,
        clinic_id: &str,
        wait_bucket: WaitBucket,
        reporter_device_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Report> {
        let report = new_report(
            clinic_id.to_string(),
            wait_bucket,
            reporter_device_id.map(str::to_string),
            created_at,
        );
        self.execute(move |conn| {
            insert_row(conn, &report)?;
            Ok(report)
        })
        .await
    }

    /// Append a report unless the same device reported for the same clinic
    /// within `cooldown` before `created_at`.
    ///
    /// Check and insert run in one transaction on the DB thread, so two
    /// concurrent submissions from one device cannot both pass the check.
    pub async fn insert_report_unless_recent(
        &self,
        clinic_id: &str,
        wait_bucket: WaitBucket,
        device_id: &str,
        created_at: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<InsertOutcome> {
        let report = new_report(
            clinic_id.to_string(),
            wait_bucket,
            Some(device_id.to_string()),
            created_at,
        );
        let device_id = device_id.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open report transaction")?;

            if let Some(last_reported_at) =
                latest_for_device(&tx, &report.clinic_id, &device_id, created_at - cooldown)?
            {
                return Ok(InsertOutcome::Throttled { last_reported_at });
            }

            insert_row(&tx, &report)?;
            tx.commit().context("failed to commit report")?;

            Ok(InsertOutcome::Inserted(report))
        })
        .await
    }

    /// Reports for a clinic with `created_at >= since`, newest first.
    pub async fn list_recent_reports(
        &self,
        clinic_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Report>> {
        let clinic_id = clinic_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, clinic_id, wait_bucket, reporter_device_id, created_at
                 FROM reports
                 WHERE clinic_id = ?1 AND created_at >= ?2
                 ORDER BY created_at DESC",
            )?;

            let mut rows = stmt.query(params![clinic_id, format_datetime(since)])?;
            let mut reports = Vec::new();
            while let Some(row) = rows.next()? {
                reports.push(row_to_report(row)?);
            }

            Ok(reports)
        })
        .await
    }

    /// When this device last reported for the clinic, if after `since`.
    pub async fn last_report_by_device(
        &self,
        clinic_id: &str,
        device_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let clinic_id = clinic_id.to_string();
        let device_id = device_id.to_string();
        self.execute(move |conn| latest_for_device(conn, &clinic_id, &device_id, since))
            .await
    }
}
