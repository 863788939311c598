/// Core data types for the climate API.
///
/// Record types mirror the two tables of the dataset one-to-one; response
/// types describe the JSON shapes served by the endpoint. No I/O here.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Storage and wire format of observation dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the trailing "last 12 months" window, in days.
pub const WINDOW_DAYS: i64 = 365;

/// Body text of the 404 returned when a date range matches nothing.
pub const NO_DATA_MESSAGE: &str =
    "No data found for the specified date range. Please check your input.";

/// `End Date` value reported when only a start date was requested.
pub const OPEN_END_LABEL: &str = "All dates after start";

// ---------------------------------------------------------------------------
// Table records
// ---------------------------------------------------------------------------

/// One row of the `station` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Unique station code, e.g. "USC00519281".
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// One row of the `measurement` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: i32,
    /// References `Station::station`.
    pub station: String,
    /// ISO date, e.g. "2017-08-23". Kept as text so that lexical and
    /// chronological ordering agree.
    pub date: String,
    /// Precipitation; missing readings are `None`.
    pub prcp: Option<f64>,
    /// Temperature observation.
    pub tobs: f64,
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// Aggregate temperature statistics for a date range. All three are `None`
/// when no measurement falls inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A single `{date, tobs}` record of the `/tobs` series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureObservation {
    pub date: String,
    pub tobs: f64,
}

/// Body of the `/api/v1.0/<start>[/<end>]` routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "TMIN")]
    pub tmin: f64,
    #[serde(rename = "TAVG")]
    pub tavg: f64,
    #[serde(rename = "TMAX")]
    pub tmax: f64,
}
