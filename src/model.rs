/// Shared data types for the hazard reporting service.
///
/// Keeps the stored row shapes (`HazardReport`, `UserActivity`) separate
/// from the wire shapes the API exchanges (`ReportRequest` in,
/// `HazardRecord` out). The wire record carries a derived `time_ago`
/// string instead of the raw timestamp; it is computed fresh on every
/// read and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Submitter id recorded when a report arrives without one.
pub const ANONYMOUS_USER: &str = "anonymous";

// ---------------------------------------------------------------------------
// Stored rows
// ---------------------------------------------------------------------------

/// A hazard report as stored in the `hazard_reports` table.
#[derive(Debug, Clone)]
pub struct HazardReport {
    pub id: i64,
    /// Free-form category label ("lights", "unsafe", "animals", ...).
    pub hazard_type: String,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    /// Reserved column. No exposed operation populates it.
    pub photo_url: Option<String>,
    pub user_id: String,
    /// Set once `verification_count` reaches the threshold; never unset.
    pub verified: bool,
    pub verification_count: i64,
    /// Assigned at insert, immutable afterwards.
    pub created_at: DateTime<Utc>,
}

impl HazardReport {
    /// Render the wire form of this report, deriving its age relative
    /// to `now`.
    pub fn to_record(&self, now: DateTime<Utc>) -> HazardRecord {
        HazardRecord {
            id: self.id,
            hazard_type: self.hazard_type.clone(),
            lat: self.lat,
            lng: self.lng,
            description: self.description.clone(),
            verified: self.verified,
            verification_count: self.verification_count,
            time_ago: time_ago(self.created_at, now),
        }
    }
}

/// Field set for a report about to be persisted. Storage assigns the id
/// and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewHazardReport {
    pub hazard_type: String,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    pub user_id: String,
}

/// Reserved row type for the `user_activities` table (user identifier,
/// action label, timestamp). The table exists for schema compatibility;
/// no operation currently writes or reads it.
#[derive(Debug, Clone)]
pub struct UserActivity {
    pub id: i64,
    pub user_id: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Incoming submission payload. `type`, `lat` and `lng` are required;
/// deserialization fails when any of them is missing or mistyped, and
/// that failure is surfaced to the client as-is.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "type")]
    pub hazard_type: String,
    pub lat: f64,
    pub lng: f64,
    pub description: Option<String>,
    pub user_id: Option<String>,
}

/// A hazard report as the API presents it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub hazard_type: String,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    pub verified: bool,
    pub verification_count: i64,
    /// Human-readable age, e.g. "2h ago".
    pub time_ago: String,
}

// ---------------------------------------------------------------------------
// Presentation derivation
// ---------------------------------------------------------------------------

/// Human-readable age of a report: whole days once at least a day old,
/// then whole hours, then whole minutes, then "Just now".
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created_at;

    if elapsed.num_days() >= 1 {
        format!("{}d ago", elapsed.num_days())
    } else if elapsed.num_hours() >= 1 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_minutes() >= 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else {
        "Just now".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report_created_at(created_at: DateTime<Utc>) -> HazardReport {
        HazardReport {
            id: 1,
            hazard_type: "unsafe".to_string(),
            lat: 40.7580,
            lng: -73.9855,
            description: "Broken streetlight".to_string(),
            photo_url: None,
            user_id: ANONYMOUS_USER.to_string(),
            verified: false,
            verification_count: 0,
            created_at,
        }
    }

    #[test]
    fn test_time_ago_just_now_under_a_minute() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(10), now), "Just now");
        assert_eq!(time_ago(now, now), "Just now");
    }

    #[test]
    fn test_time_ago_minutes() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(90), now), "1m ago");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59m ago");
    }

    #[test]
    fn test_time_ago_hours() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::hours(2), now), "2h ago");
        assert_eq!(time_ago(now - Duration::minutes(61), now), "1h ago");
    }

    #[test]
    fn test_time_ago_days() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::hours(25), now), "1d ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3d ago");
    }

    #[test]
    fn test_record_serializes_type_field_name() {
        // Wire contract uses "type", which Rust can't use as a field name.
        let now = Utc::now();
        let record = report_created_at(now).to_record(now);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], "unsafe");
        assert!(value.get("hazard_type").is_none());
        assert_eq!(value["time_ago"], "Just now");
    }

    #[test]
    fn test_record_excludes_internal_fields() {
        let now = Utc::now();
        let record = report_created_at(now).to_record(now);
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("photo_url").is_none());
        assert!(value.get("user_id").is_none());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_request_rejects_missing_required_field() {
        let result: Result<ReportRequest, _> =
            serde_json::from_str(r#"{"lat": 40.0, "lng": -73.0}"#);
        let err = result.expect_err("payload without type should be rejected");
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn test_request_optional_fields_default_to_none() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"type": "animals", "lat": 40.0, "lng": -73.0}"#)
                .expect("minimal payload should parse");

        assert_eq!(request.hazard_type, "animals");
        assert!(request.description.is_none());
        assert!(request.user_id.is_none());
    }

    #[test]
    fn test_request_accepts_integer_coordinates() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"type": "unsafe", "lat": 40, "lng": -73}"#)
                .expect("integer coordinates should coerce to floats");

        assert_eq!(request.lat, 40.0);
        assert_eq!(request.lng, -73.0);
    }
}
