//! Loads the climate dataset CSV export into PostgreSQL.
//!
//! Creates the schema if needed, then replaces the contents of the
//! `station` and `measurement` tables with the CSV rows inside a single
//! transaction, so the API never sees a half-loaded dataset.
//!
//! Usage:
//!   cargo run --bin load_dataset -- [DIR]    # DIR defaults to Resources/
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string

use climate_api::dataset;
use climate_api::db;

use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Resources"));

    println!("📋 Reading dataset from {}", dir.display());
    let (stations, measurements) = match dataset::load_dir(&dir) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    let mut client = match db::connect_with_validation() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("\n❌ {}\n", e);
            process::exit(1);
        }
    };

    println!("📥 Loading into database...");
    if let Err(e) = db::create_schema(&mut client) {
        log::error!("Schema creation failed: {}", e);
        process::exit(1);
    }
    if let Err(e) = db::replace_dataset(&mut client, &stations, &measurements) {
        log::error!("Load failed, transaction rolled back: {}", e);
        process::exit(1);
    }
    println!("   ✓ {} stations, {} measurements", stations.len(), measurements.len());
    println!("✓ Dataset loaded");
}
