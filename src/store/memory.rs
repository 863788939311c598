/// In-memory `ClimateStore`.
///
/// Holds both tables as vectors in insertion order and answers the same
/// queries as `PgStore`, comparing dates as text. Cloning is cheap (the
/// tables sit behind an `Arc`), so one loaded dataset can back any number
/// of sessions.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ClimateError, Result};
use crate::model::{Measurement, Station, TemperatureStats};
use crate::store::ClimateStore;

#[derive(Debug)]
struct Tables {
    stations: Vec<Station>,
    measurements: Vec<Measurement>,
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<Tables>,
}

impl MemoryStore {
    pub fn new(stations: Vec<Station>, measurements: Vec<Measurement>) -> Self {
        Self {
            tables: Arc::new(Tables { stations, measurements }),
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.tables.stations
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.tables.measurements
    }
}

impl ClimateStore for MemoryStore {
    fn max_date(&mut self) -> Result<String> {
        self.measurements()
            .iter()
            .map(|m| m.date.as_str())
            .max()
            .map(str::to_string)
            .ok_or(ClimateError::EmptyDataset("latest observation date"))
    }

    fn precipitation_since(&mut self, since: &str) -> Result<Vec<(String, Option<f64>)>> {
        Ok(self
            .measurements()
            .iter()
            .filter(|m| m.date.as_str() >= since)
            .map(|m| (m.date.clone(), m.prcp))
            .collect())
    }

    fn all_station_codes(&mut self) -> Result<Vec<String>> {
        Ok(self.stations().iter().map(|s| s.station.clone()).collect())
    }

    fn most_active_station(&mut self) -> Result<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for m in self.measurements() {
            *counts.entry(m.station.as_str()).or_default() += 1;
        }

        // BTreeMap iterates in code order; strict `>` keeps the lowest code on ties
        let mut best: Option<(&str, usize)> = None;
        for (station, count) in counts {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((station, count));
            }
        }

        best.map(|(station, _)| station.to_string())
            .ok_or(ClimateError::EmptyDataset("most active station"))
    }

    fn temperatures_for_station_since(&mut self, station: &str, since: &str) -> Result<Vec<(String, f64)>> {
        Ok(self
            .measurements()
            .iter()
            .filter(|m| m.station == station && m.date.as_str() >= since)
            .map(|m| (m.date.clone(), m.tobs))
            .collect())
    }

    fn temperature_stats_in_range(&mut self, start: &str, end: Option<&str>) -> Result<TemperatureStats> {
        let mut stats = TemperatureStats::default();
        let mut sum = 0.0;
        let mut count = 0usize;

        let in_range = self.measurements().iter().filter(|m| {
            m.date.as_str() >= start && end.is_none_or(|end| m.date.as_str() <= end)
        });

        for m in in_range {
            stats.min = Some(stats.min.map_or(m.tobs, |min| min.min(m.tobs)));
            stats.max = Some(stats.max.map_or(m.tobs, |max| max.max(m.tobs)));
            sum += m.tobs;
            count += 1;
        }

        if count > 0 {
            stats.avg = Some(sum / count as f64);
        }

        Ok(stats)
    }
}
