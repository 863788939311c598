//! Data access layer over the `station` and `measurement` tables.
//!
//! `ClimateStore` is the fixed set of queries the API needs. Dates are
//! passed and returned as ISO `YYYY-MM-DD` text and compared bytewise as
//! text; `PgStore` pins the "C" collation so the database agrees.
//!
//! Implementations:
//! - `pg::PgStore` — one SQL statement per operation
//! - `memory::MemoryStore` — in-process tables with identical semantics

pub mod memory;
pub mod pg;

pub use self::memory::MemoryStore;
pub use self::pg::PgStore;

use crate::error::Result;
use crate::model::TemperatureStats;

pub trait ClimateStore {
    /// Latest observation date across all measurements.
    ///
    /// Fails with `EmptyDataset` when the measurement table has no rows.
    fn max_date(&mut self) -> Result<String>;

    /// `(date, prcp)` for every measurement with `date >= since`, in store
    /// order. Rows from different stations on the same date are all returned.
    fn precipitation_since(&mut self, since: &str) -> Result<Vec<(String, Option<f64>)>>;

    /// Every station code, in store order.
    fn all_station_codes(&mut self) -> Result<Vec<String>>;

    /// Station with the most measurement rows. Ties resolve to the lowest
    /// station code.
    ///
    /// Fails with `EmptyDataset` when the measurement table has no rows.
    fn most_active_station(&mut self) -> Result<String>;

    /// `(date, tobs)` for one station with `date >= since`, in store order.
    fn temperatures_for_station_since(&mut self, station: &str, since: &str) -> Result<Vec<(String, f64)>>;

    /// Min/avg/max of `tobs` over `start <= date [<= end]`. An absent `end`
    /// leaves the range unbounded above. All fields are `None` when nothing
    /// matches.
    fn temperature_stats_in_range(&mut self, start: &str, end: Option<&str>) -> Result<TemperatureStats>;
}
