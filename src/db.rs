/// SQLite storage for hazard reports.
///
/// A single local database file owns all persisted state. The schema is
/// bootstrapped on open, so a fresh deployment needs no migration step.
/// No locking or transactions are layered on top of SQLite's own: each
/// insert or update is one statement committing atomically per call.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::model::{HazardReport, NewHazardReport};

/// Statements run on every open to bootstrap the schema.
///
/// `user_activities` is a reserved table (user identifier, action label,
/// timestamp): created for schema compatibility, untouched by every
/// exposed operation. Likewise the `photo_url` column is declared but
/// never populated.
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS hazard_reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        lat REAL NOT NULL,
        lng REAL NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        photo_url TEXT,
        user_id TEXT NOT NULL DEFAULT 'anonymous',
        verified INTEGER NOT NULL DEFAULT 0,
        verification_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_hazard_reports_created_at
        ON hazard_reports (created_at)",
    "CREATE TABLE IF NOT EXISTS user_activities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT,
        action TEXT,
        created_at TEXT NOT NULL
    )",
];

const REPORT_COLUMNS: &str =
    "id, type, lat, lng, description, photo_url, user_id, verified, verification_count, created_at";

/// Handle over the hazard report store.
///
/// Constructed once at startup and handed to the service layer; nothing
/// else in the crate touches the connection.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    conn: Connection,
}

impl Database {
    /// Open or create the database file at the given path and bootstrap
    /// the schema.
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let path = path.as_ref().to_path_buf();

        debug!("opening database at {}", path.display());
        let conn = Connection::open(&path)?;

        // WAL keeps readers unblocked while a write commits
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        initialize_schema(&conn)?;

        info!("database ready at {}", path.display());
        Ok(Self { path, conn })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a new report. Assigns the id and the creation timestamp
    /// (current time) and returns the stored row.
    pub fn insert_report(&self, new: &NewHazardReport) -> rusqlite::Result<HazardReport> {
        let created_at = Utc::now();

        self.conn.execute(
            "INSERT INTO hazard_reports (type, lat, lng, description, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.hazard_type,
                new.lat,
                new.lng,
                new.description,
                new.user_id,
                created_at.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("inserted hazard report {}", id);

        Ok(HazardReport {
            id,
            hazard_type: new.hazard_type.clone(),
            lat: new.lat,
            lng: new.lng,
            description: new.description.clone(),
            photo_url: None,
            user_id: new.user_id.clone(),
            verified: false,
            verification_count: 0,
            created_at,
        })
    }

    /// All reports created strictly after `cutoff`, most recent first.
    pub fn reports_since(&self, cutoff: DateTime<Utc>) -> rusqlite::Result<Vec<HazardReport>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM hazard_reports
             WHERE created_at > ?1
             ORDER BY created_at DESC"
        ))?;

        let reports = stmt
            .query_map([cutoff.to_rfc3339()], Self::row_to_report)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    /// Look up a single report by id.
    pub fn get_report(&self, id: i64) -> rusqlite::Result<Option<HazardReport>> {
        self.conn
            .query_row(
                &format!("SELECT {REPORT_COLUMNS} FROM hazard_reports WHERE id = ?1"),
                [id],
                Self::row_to_report,
            )
            .optional()
    }

    /// Persist the mutable fields of an existing report. Returns whether
    /// a row was updated.
    pub fn update_report(&self, report: &HazardReport) -> rusqlite::Result<bool> {
        let affected = self.conn.execute(
            "UPDATE hazard_reports SET verified = ?1, verification_count = ?2 WHERE id = ?3",
            params![report.verified, report.verification_count, report.id],
        )?;

        Ok(affected > 0)
    }

    /// Total number of reports ever stored.
    pub fn count_reports(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM hazard_reports", [], |row| row.get(0))
    }

    /// Number of reports created strictly after `cutoff`.
    pub fn count_reports_since(&self, cutoff: DateTime<Utc>) -> rusqlite::Result<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM hazard_reports WHERE created_at > ?1",
            [cutoff.to_rfc3339()],
            |row| row.get(0),
        )
    }

    /// Number of reports that reached verified status.
    pub fn count_verified(&self) -> rusqlite::Result<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM hazard_reports WHERE verified = 1",
            [],
            |row| row.get(0),
        )
    }

    fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<HazardReport> {
        let created_at_str: String = row.get(9)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        Ok(HazardReport {
            id: row.get(0)?,
            hazard_type: row.get(1)?,
            lat: row.get(2)?,
            lng: row.get(3)?,
            description: row.get(4)?,
            photo_url: row.get(5)?,
            user_id: row.get(6)?,
            verified: row.get(7)?,
            verification_count: row.get(8)?,
            created_at,
        })
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
