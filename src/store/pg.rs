/// PostgreSQL-backed `ClimateStore`.
///
/// Each `PgStore` owns one connection; dropping it closes the connection.
/// Row order is made explicit with `ORDER BY id` wherever the API exposes
/// store order for measurements.
///
/// Every text comparison and sort names `COLLATE "C"`, so dates and station
/// codes compare bytewise like `MemoryStore` even on tables created with a
/// locale collation.

use postgres::{Client, NoTls};

use crate::error::{ClimateError, Result};
use crate::model::TemperatureStats;
use crate::store::ClimateStore;

pub struct PgStore {
    client: Client,
}

impl PgStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Opens a dedicated connection to `db_url`.
    pub fn connect(db_url: &str) -> Result<Self> {
        let client = Client::connect(db_url, NoTls)?;
        Ok(Self::new(client))
    }
}

impl ClimateStore for PgStore {
    fn max_date(&mut self) -> Result<String> {
        let row = self.client.query_one("SELECT MAX(date COLLATE \"C\") FROM measurement", &[])?;
        let latest: Option<String> = row.get(0);
        latest.ok_or(ClimateError::EmptyDataset("latest observation date"))
    }

    fn precipitation_since(&mut self, since: &str) -> Result<Vec<(String, Option<f64>)>> {
        let rows = self.client.query(
            "SELECT date, prcp
             FROM measurement
             WHERE date COLLATE \"C\" >= $1
             ORDER BY id",
            &[&since],
        )?;

        Ok(rows.iter().map(|row| (row.get(0), row.get(1))).collect())
    }

    fn all_station_codes(&mut self) -> Result<Vec<String>> {
        let rows = self.client.query("SELECT station FROM station", &[])?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    fn most_active_station(&mut self) -> Result<String> {
        let row = self.client.query_opt(
            "SELECT station
             FROM measurement
             GROUP BY station
             ORDER BY COUNT(*) DESC, station COLLATE \"C\"
             LIMIT 1",
            &[],
        )?;

        row.map(|r| r.get(0))
            .ok_or(ClimateError::EmptyDataset("most active station"))
    }

    fn temperatures_for_station_since(&mut self, station: &str, since: &str) -> Result<Vec<(String, f64)>> {
        let rows = self.client.query(
            "SELECT date, tobs
             FROM measurement
             WHERE station COLLATE \"C\" = $1 AND date COLLATE \"C\" >= $2
             ORDER BY id",
            &[&station, &since],
        )?;

        Ok(rows.iter().map(|row| (row.get(0), row.get(1))).collect())
    }

    fn temperature_stats_in_range(&mut self, start: &str, end: Option<&str>) -> Result<TemperatureStats> {
        let row = self.client.query_one(
            "SELECT MIN(tobs), AVG(tobs), MAX(tobs)
             FROM measurement
             WHERE date COLLATE \"C\" >= $1
               AND ($2::TEXT IS NULL OR date COLLATE \"C\" <= $2)",
            &[&start, &end],
        )?;

        Ok(TemperatureStats {
            min: row.get(0),
            avg: row.get(1),
            max: row.get(2),
        })
    }
}
