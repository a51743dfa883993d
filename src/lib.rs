/// saferoute_service: community hazard reporting backend.
///
/// # Module structure
///
/// ```text
/// saferoute_service
/// ├── model     — shared data types (HazardReport, HazardRecord, …)
/// ├── config    — runtime settings (saferoute.toml, env overrides)
/// ├── db        — SQLite storage for hazard reports
/// ├── service   — submit / list / verify / stats operations
/// ├── locations — fixed named-place registry behind the search endpoint
/// └── endpoint  — HTTP API: routing, parsing, response envelope
/// ```

/// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod locations;
pub mod model;
pub mod service;
