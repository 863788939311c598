//! Climate Analysis API - HTTP server
//!
//! Serves precipitation, station and temperature statistics for the
//! climate dataset over a small read-only JSON API.
//!
//! Usage:
//!   cargo run --release                              # Serve from PostgreSQL (DATABASE_URL)
//!   cargo run --release -- --port 8080               # Override the configured port
//!   cargo run --release -- --config other.toml       # Use another configuration file
//!   cargo run --release -- --data-dir Resources/     # Serve the CSV export from memory
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string
//!   RUST_LOG     - log filter (default: info)

use climate_api::config::{self, DEFAULT_CONFIG_PATH};
use climate_api::db;
use climate_api::dataset;
use climate_api::endpoint::{self, AppContext};
use climate_api::session::PgSessionFactory;
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

struct Args {
    config_path: PathBuf,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
}

fn usage_exit(program: &str, message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Usage: {} [--port PORT] [--config PATH] [--data-dir DIR]", program);
    process::exit(1);
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        port: None,
        data_dir: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let Some(value) = args.get(i + 1) else {
            usage_exit(&args[0], &format!("{} requires a value", flag));
        };

        match flag {
            "--port" => match value.parse() {
                Ok(port) => parsed.port = Some(port),
                Err(_) => usage_exit(&args[0], &format!("invalid port '{}'", value)),
            },
            "--config" => parsed.config_path = PathBuf::from(value),
            "--data-dir" => parsed.data_dir = Some(PathBuf::from(value)),
            _ => usage_exit(&args[0], &format!("unknown argument '{}'", flag)),
        }
        i += 2;
    }

    parsed
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();

    let mut config = match config::load_config(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    log::info!("Climate Analysis API starting");

    let ctx = match args.data_dir {
        Some(dir) => match dataset::load_memory_store(&dir) {
            Ok(store) => {
                log::info!(
                    "Loaded {} stations and {} measurements from {}",
                    store.stations().len(),
                    store.measurements().len(),
                    dir.display()
                );
                AppContext::new(config, store)
            }
            Err(e) => {
                log::error!("Failed to load dataset: {}", e);
                process::exit(1);
            }
        },
        None => {
            // Validate once at startup; requests open their own connections
            let db_url = match db::database_url() {
                Ok(url) => url,
                Err(e) => {
                    log::error!("{}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = db::connect_and_verify(db::REQUIRED_TABLES) {
                log::error!("Database validation failed:\n{}", e);
                process::exit(1);
            }
            log::info!("Database tables verified");
            AppContext::new(config, PgSessionFactory::new(db_url))
        }
    };

    if let Err(e) = endpoint::start_endpoint_server(Arc::new(ctx)) {
        log::error!("Endpoint server error: {}", e);
        process::exit(1);
    }
}
