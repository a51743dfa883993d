//! SafeRoute Backend - Hazard Reporting Service
//!
//! A small HTTP service where users drop geolocated hazard reports,
//! browse recent ones, crowd-verify them, and fetch coarse usage stats.
//! Storage is a single local SQLite file created on startup.
//!
//! Usage:
//!   cargo run --release                     # port 5000, ./saferoute.db
//!   cargo run --release -- --port 8080      # override the listen port
//!   cargo run --release -- --db /tmp/sr.db  # override the database path
//!
//! Environment:
//!   SAFEROUTE_PORT - listen port
//!   SAFEROUTE_DB   - SQLite database path

use saferoute_service::config::ServiceConfig;
use saferoute_service::db::Database;
use saferoute_service::endpoint;
use saferoute_service::service::ReportService;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("saferoute_service=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    println!("🚧 SafeRoute Backend");
    println!("====================\n");

    let mut config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Parse command-line overrides
    let args: Vec<String> = env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse() {
                        Ok(port) => config.port = port,
                        Err(_) => {
                            eprintln!("Error: --port requires a port number");
                            std::process::exit(1);
                        }
                    }
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            }
            "--db" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --db requires a file path");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--port PORT] [--db PATH]", args[0]);
                std::process::exit(1);
            }
        }
    }

    // Open storage (creates the file and schema on first run)
    println!("📊 Opening database...");
    let db = match Database::open(&config.database_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("\n❌ Failed to open database: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ Database ready at {}\n", db.path().display());

    let service = ReportService::new(db);

    println!("🚀 Starting SafeRoute API...");
    println!("   📍 API URL: http://localhost:{}", config.port);
    println!("   📊 Database: {}\n", config.database_path);

    if let Err(e) = endpoint::start_endpoint_server(config.port, service) {
        eprintln!("\n❌ Server error: {}", e);
        std::process::exit(1);
    }
}
