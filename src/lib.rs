/// climate_api: read-only HTTP API over a weather station dataset.
///
/// # Module structure
///
/// ```text
/// climate_api
/// ├── model      — table records and response types (Station, Measurement, …)
/// ├── error      — ClimateError and its HTTP status mapping
/// ├── config     — service configuration loader (climate_api.toml)
/// ├── db         — PostgreSQL connection and table validation
/// ├── store
/// │   ├── pg     — PostgreSQL-backed ClimateStore
/// │   └── memory — in-memory ClimateStore
/// ├── session    — per-request store sessions
/// ├── analysis
/// │   ├── window — trailing 365-day window
/// │   └── series — precipitation, TOBS and temperature summaries
/// ├── dataset    — CSV parsing for the load_dataset binary
/// └── endpoint   — routes and HTTP server
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod dataset;
pub mod db;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
