/// Business operations over hazard reports.
///
/// `ReportService` owns the storage handle and exposes the four
/// operations the API maps onto: submit, list recent, verify, stats.
/// Failures are explicit `ServiceError` values; the HTTP layer turns
/// them into the response envelope.

use std::error::Error;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::model::{ANONYMOUS_USER, HazardRecord, NewHazardReport, ReportRequest};

/// Confirmations required before a report is marked verified.
pub const VERIFICATION_THRESHOLD: i64 = 3;

/// Recency window, in hours, for the default listing and the "active"
/// stat.
pub const DEFAULT_WINDOW_HOURS: i64 = 48;

/// Longest accepted description, matching the column's declared bound.
pub const MAX_DESCRIPTION_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure modes of the report operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Submission payload failed validation; the message is surfaced to
    /// the client verbatim.
    Validation(String),
    /// Referenced report id does not exist.
    NotFound,
    /// Underlying storage failed.
    Storage(rusqlite::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(message) => write!(f, "{}", message),
            ServiceError::NotFound => write!(f, "Not found"),
            ServiceError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl Error for ServiceError {}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Storage(err)
    }
}

// ---------------------------------------------------------------------------
// Result shapes
// ---------------------------------------------------------------------------

/// Recent hazards: how many fell inside the window, plus the records
/// ordered most recent first.
#[derive(Debug)]
pub struct RecentHazards {
    pub count: usize,
    pub hazards: Vec<HazardRecord>,
}

/// Coarse usage counts. Each field comes from an independent query with
/// no snapshot isolation; under concurrent writes the three may disagree
/// slightly, which is accepted behavior.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub active_hazards: i64,
    pub total_reports: i64,
    pub verified_hazards: i64,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Report operations over an explicitly constructed storage handle.
pub struct ReportService {
    db: Database,
}

impl ReportService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validate and persist a new report. Returns the created record;
    /// its age always renders as "Just now".
    pub fn submit(&self, request: ReportRequest) -> Result<HazardRecord, ServiceError> {
        let description = request.description.unwrap_or_default();
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(ServiceError::Validation(format!(
                "description must be at most {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }

        let new = NewHazardReport {
            hazard_type: request.hazard_type,
            lat: request.lat,
            lng: request.lng,
            description,
            user_id: request
                .user_id
                .unwrap_or_else(|| ANONYMOUS_USER.to_string()),
        };

        let report = self.db.insert_report(&new)?;
        info!(
            "report {} submitted by {} ({})",
            report.id, report.user_id, report.hazard_type
        );

        Ok(report.to_record(Utc::now()))
    }

    /// Reports created within the last `hours` hours, most recent first.
    pub fn list_recent(&self, hours: i64) -> Result<RecentHazards, ServiceError> {
        let cutoff = window_cutoff(hours)?;
        let reports = self.db.reports_since(cutoff)?;

        let now = Utc::now();
        let hazards: Vec<HazardRecord> = reports.iter().map(|r| r.to_record(now)).collect();

        Ok(RecentHazards {
            count: hazards.len(),
            hazards,
        })
    }

    /// Register one confirmation for a report. Marks it verified once
    /// the count reaches the threshold; the flag never reverts, and
    /// confirmations keep counting past it.
    pub fn verify(&self, id: i64) -> Result<(), ServiceError> {
        let mut report = self.db.get_report(id)?.ok_or(ServiceError::NotFound)?;

        report.verification_count += 1;
        if report.verification_count >= VERIFICATION_THRESHOLD {
            report.verified = true;
        }
        self.db.update_report(&report)?;

        info!(
            "report {} confirmed ({} of {})",
            id, report.verification_count, VERIFICATION_THRESHOLD
        );
        Ok(())
    }

    /// Usage counts: active within the default window, total ever, and
    /// verified.
    pub fn stats(&self) -> Result<UsageStats, ServiceError> {
        let cutoff = window_cutoff(DEFAULT_WINDOW_HOURS)?;

        Ok(UsageStats {
            active_hazards: self.db.count_reports_since(cutoff)?,
            total_reports: self.db.count_reports()?,
            verified_hazards: self.db.count_verified()?,
        })
    }
}

/// Cutoff timestamp for an hour window ending now. Windows too large to
/// represent are rejected rather than wrapping.
fn window_cutoff(hours: i64) -> Result<DateTime<Utc>, ServiceError> {
    Duration::try_hours(hours)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| ServiceError::Validation(format!("invalid hours window: {}", hours)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
