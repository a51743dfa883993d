/// HTTP surface for the hazard reporting service.
///
/// Thin mapping from requests to `ReportService` and location-search
/// calls, with every response wrapped in the `{success, ...}` envelope
/// (failures carry an `error` message alongside `success: false`).
///
/// Endpoints:
/// - GET  /                - service info
/// - GET  /api/hazards     - recent hazards (`hours` window, default 48)
/// - POST /api/report      - submit a hazard report
/// - POST /api/verify/{id} - add one confirmation to a report
/// - GET  /api/stats       - usage counts
/// - GET  /api/search      - named-place lookup (`q`)

use std::io::Read;

use serde_json::{Value, json};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::warn;

use crate::locations;
use crate::model::ReportRequest;
use crate::service::{DEFAULT_WINDOW_HOURS, ReportService, ServiceError};

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

/// Start the API server on the given port and serve until the process
/// exits. Requests are handled one at a time; SQLite's own locking is
/// the only concurrency control in play.
pub fn start_endpoint_server(port: u16, service: ReportService) -> Result<(), String> {
    let server = Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 API listening on http://0.0.0.0:{}", port);

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let mut body = String::new();
        let (status, payload) = match request.as_reader().read_to_string(&mut body) {
            Ok(_) => dispatch(&method, &url, &body, &service),
            Err(e) => (500, failure(&format!("Failed to read request body: {}", e))),
        };

        if let Err(e) = request.respond(create_response(status, payload)) {
            warn!("failed to send response: {}", e);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Route a request to its handler. Returns the status code and JSON
/// payload; `start_endpoint_server` is a socket loop around this.
pub fn dispatch(method: &Method, url: &str, body: &str, service: &ReportService) -> (u16, Value) {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };

    match (method, path) {
        (Method::Get, "/") => handle_home(),
        (Method::Get, "/api/hazards") => handle_hazards(service, query),
        (Method::Post, "/api/report") => handle_report(service, body),
        (Method::Post, _) if path.starts_with("/api/verify/") => {
            handle_verify(service, path.trim_start_matches("/api/verify/"))
        }
        (Method::Get, "/api/stats") => handle_stats(service),
        (Method::Get, "/api/search") => handle_search(query),
        _ => (
            404,
            json!({
                "success": false,
                "error": "Not found",
                "available_endpoints": [
                    "/", "/api/hazards", "/api/report", "/api/verify/{id}",
                    "/api/stats", "/api/search",
                ],
            }),
        ),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_home() -> (u16, Value) {
    (
        200,
        json!({
            "name": "SafeRoute API",
            "status": "running",
            "endpoints": ["/api/hazards", "/api/report", "/api/stats"],
        }),
    )
}

fn handle_hazards(service: &ReportService, query: &str) -> (u16, Value) {
    // Non-integer values fall back to the default window.
    let hours = query_param(query, "hours")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(DEFAULT_WINDOW_HOURS);

    match service.list_recent(hours) {
        Ok(recent) => (
            200,
            json!({
                "success": true,
                "count": recent.count,
                "hazards": recent.hazards,
            }),
        ),
        Err(e) => failure_response(&e),
    }
}

fn handle_report(service: &ReportService, body: &str) -> (u16, Value) {
    let request: ReportRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return (500, failure(&e.to_string())),
    };

    match service.submit(request) {
        Ok(hazard) => (201, json!({"success": true, "hazard": hazard})),
        Err(e) => failure_response(&e),
    }
}

fn handle_verify(service: &ReportService, raw_id: &str) -> (u16, Value) {
    // Ids that do not parse as integers get the same envelope as unknown
    // ones.
    let id = match raw_id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => return (404, failure("Not found")),
    };

    match service.verify(id) {
        Ok(()) => (200, json!({"success": true})),
        Err(e) => failure_response(&e),
    }
}

fn handle_stats(service: &ReportService) -> (u16, Value) {
    match service.stats() {
        Ok(stats) => (200, json!({"success": true, "stats": stats})),
        Err(e) => failure_response(&e),
    }
}

fn handle_search(query: &str) -> (u16, Value) {
    let q = query_param(query, "q").unwrap_or_default();
    let results = locations::search(&q);

    (200, json!({"success": true, "results": results}))
}

// ---------------------------------------------------------------------------
// Envelope and parsing helpers
// ---------------------------------------------------------------------------

/// Map a service error to its status code and failure envelope.
fn failure_response(err: &ServiceError) -> (u16, Value) {
    let status = match err {
        ServiceError::NotFound => 404,
        ServiceError::Validation(_) | ServiceError::Storage(_) => 500,
    };
    (status, failure(&err.to_string()))
}

fn failure(message: &str) -> Value {
    json!({"success": false, "error": message})
}

/// Extract and percent-decode one query-string parameter.
fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key {
            Some(
                urlencoding::decode(v)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| v.to_string()),
            )
        } else {
            None
        }
    })
}

/// Build an HTTP response with a JSON body.
fn create_response(status_code: u16, json: Value) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&json).unwrap();
    let bytes = body.into_bytes();

    Response::from_data(bytes)
        .with_status_code(StatusCode::from(status_code))
        .with_header(
            Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn test_service() -> ReportService {
        let db = Database::open_in_memory().expect("failed to create in-memory database");
        ReportService::new(db)
    }

    #[test]
    fn test_query_param_basic() {
        assert_eq!(query_param("hours=24", "hours"), Some("24".to_string()));
        assert_eq!(
            query_param("a=1&hours=24&b=2", "hours"),
            Some("24".to_string())
        );
    }

    #[test]
    fn test_query_param_missing() {
        assert_eq!(query_param("", "hours"), None);
        assert_eq!(query_param("hours", "hours"), None);
        assert_eq!(query_param("h=1", "hours"), None);
    }

    #[test]
    fn test_query_param_percent_decodes() {
        assert_eq!(
            query_param("q=central%20park", "q"),
            Some("central park".to_string())
        );
        assert_eq!(query_param("q=times+square", "q"), Some("times+square".to_string()));
    }

    #[test]
    fn test_dispatch_home() {
        let service = test_service();
        let (status, payload) = dispatch(&Method::Get, "/", "", &service);

        assert_eq!(status, 200);
        assert_eq!(payload["name"], "SafeRoute API");
        assert_eq!(payload["status"], "running");
        assert!(payload["endpoints"].is_array());
    }

    #[test]
    fn test_dispatch_unknown_route() {
        let service = test_service();
        let (status, payload) = dispatch(&Method::Get, "/api/nope", "", &service);

        assert_eq!(status, 404);
        assert_eq!(payload["success"], false);
        assert_eq!(payload["error"], "Not found");
    }

    #[test]
    fn test_dispatch_wrong_method_is_unknown() {
        let service = test_service();
        let (status, _) = dispatch(&Method::Delete, "/api/hazards", "", &service);
        assert_eq!(status, 404);

        let (status, _) = dispatch(&Method::Get, "/api/report", "", &service);
        assert_eq!(status, 404);
    }

    #[test]
    fn test_dispatch_hazards_ignores_bad_hours() {
        let service = test_service();
        let (status, payload) =
            dispatch(&Method::Get, "/api/hazards?hours=abc", "", &service);

        assert_eq!(status, 200);
        assert_eq!(payload["success"], true);
        assert_eq!(payload["count"], 0);
    }

    #[test]
    fn test_dispatch_report_malformed_json() {
        let service = test_service();
        let (status, payload) =
            dispatch(&Method::Post, "/api/report", "{not json", &service);

        assert_eq!(status, 500);
        assert_eq!(payload["success"], false);
        assert!(payload["error"].as_str().unwrap().len() > 0);
    }

    #[test]
    fn test_dispatch_verify_non_integer_id() {
        let service = test_service();
        let (status, payload) =
            dispatch(&Method::Post, "/api/verify/abc", "", &service);

        assert_eq!(status, 404);
        assert_eq!(payload["error"], "Not found");
    }

    #[test]
    fn test_dispatch_search_decodes_query() {
        let service = test_service();
        let (status, payload) =
            dispatch(&Method::Get, "/api/search?q=central%20p", "", &service);

        assert_eq!(status, 200);
        assert_eq!(payload["results"].as_array().unwrap().len(), 1);
        assert_eq!(payload["results"][0]["name"], "Central Park");
    }
}
