/// Series and summary computations served by the API.
///
/// All three functions take an open store session and return response-ready
/// values; HTTP concerns stay in `endpoint`.

use std::collections::BTreeMap;

use crate::analysis::window::last_twelve_months_start;
use crate::error::{ClimateError, Result};
use crate::model::{OPEN_END_LABEL, TemperatureObservation, TemperatureSummary};
use crate::store::ClimateStore;

/// Date → precipitation over the last 12 months.
///
/// Keyed by date alone: when several stations report on the same date, the
/// row returned last by the store overwrites the others. Missing readings
/// map to `None`.
pub fn precipitation_series(store: &mut dyn ClimateStore) -> Result<BTreeMap<String, Option<f64>>> {
    let since = last_twelve_months_start(store)?;
    let rows = store.precipitation_since(&since)?;

    let mut series = BTreeMap::new();
    for (date, prcp) in rows {
        series.insert(date, prcp);
    }

    Ok(series)
}

/// Temperature observations of the most active station over the last
/// 12 months, in store order.
pub fn most_active_station_temperatures(store: &mut dyn ClimateStore) -> Result<Vec<TemperatureObservation>> {
    let station = store.most_active_station()?;
    let since = last_twelve_months_start(store)?;
    log::debug!("Most active station {} since {}", station, since);

    let rows = store.temperatures_for_station_since(&station, &since)?;
    Ok(rows
        .into_iter()
        .map(|(date, tobs)| TemperatureObservation { date, tobs })
        .collect())
}

/// TMIN/TAVG/TMAX from `start` through `end` (or open-ended).
///
/// An empty range is `NoMatchingRange`, never a zero-valued summary. Bounds
/// are compared as text, so reversed or non-ISO bounds simply match nothing.
pub fn temperature_summary(
    store: &mut dyn ClimateStore,
    start: &str,
    end: Option<&str>,
) -> Result<TemperatureSummary> {
    let stats = store.temperature_stats_in_range(start, end)?;
    log::debug!("Temperature stats for {}..{:?}: {:?}", start, end, stats);

    match (stats.min, stats.avg, stats.max) {
        (Some(tmin), Some(tavg), Some(tmax)) => Ok(TemperatureSummary {
            start_date: start.to_string(),
            end_date: end.unwrap_or(OPEN_END_LABEL).to_string(),
            tmin,
            tavg,
            tmax,
        }),
        _ => Err(ClimateError::NoMatchingRange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::store::memory::tests::{measurement, sample_store, station};

    #[test]
    fn test_precipitation_series_covers_window_only() {
        let series = precipitation_series(&mut sample_store()).unwrap();

        assert!(!series.contains_key("2016-08-22"), "day before window start is excluded");
        assert!(series.contains_key("2016-08-23"), "window start is inclusive");
        assert_eq!(series.len(), 3);
        assert_eq!(series["2017-08-23"], Some(0.45));
    }

    #[test]
    fn test_precipitation_series_later_row_wins_shared_date() {
        let series = precipitation_series(&mut sample_store()).unwrap();

        // Rows 2 (0.00) and 3 (1.79) share 2016-08-23; row 3 comes last
        assert_eq!(series["2016-08-23"], Some(1.79));
        // Rows 4 (null) and 5 (0.02) share 2017-01-15; row 5 comes last
        assert_eq!(series["2017-01-15"], Some(0.02));
    }

    #[test]
    fn test_precipitation_series_keeps_null_readings() {
        let mut store = MemoryStore::new(
            vec![station("A")],
            vec![measurement(1, "A", "2017-08-23", None, 70.0)],
        );
        let series = precipitation_series(&mut store).unwrap();
        assert_eq!(series["2017-08-23"], None);

        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"2017-08-23":null}"#);
    }

    #[test]
    fn test_most_active_station_temperatures() {
        let tobs = most_active_station_temperatures(&mut sample_store()).unwrap();
        let dates: Vec<&str> = tobs.iter().map(|t| t.date.as_str()).collect();

        assert_eq!(dates, vec!["2016-08-23", "2017-01-15", "2017-08-23"]);
        assert_eq!(tobs[0].tobs, 77.0);
    }

    #[test]
    fn test_empty_dataset_propagates() {
        let mut store = MemoryStore::new(vec![station("A")], vec![]);
        assert!(matches!(precipitation_series(&mut store), Err(ClimateError::EmptyDataset(_))));
        assert!(matches!(most_active_station_temperatures(&mut store), Err(ClimateError::EmptyDataset(_))));
    }

    #[test]
    fn test_open_ended_summary_labels_end_date() {
        let summary = temperature_summary(&mut sample_store(), "2017-01-01", None).unwrap();
        assert_eq!(summary.start_date, "2017-01-01");
        assert_eq!(summary.end_date, "All dates after start");
        assert_eq!(summary.tmin, 65.0);
        assert_eq!(summary.tmax, 79.0);
    }

    #[test]
    fn test_bounded_summary_echoes_end_date() {
        let summary = temperature_summary(&mut sample_store(), "2016-08-22", Some("2016-08-23")).unwrap();
        assert_eq!(summary.end_date, "2016-08-23");
        assert_eq!(summary.tmin, 76.0);
        assert_eq!(summary.tavg, (76.0 + 81.0 + 77.0) / 3.0);
        assert_eq!(summary.tmax, 81.0);
    }

    #[test]
    fn test_summary_for_empty_range_is_no_match() {
        let mut store = sample_store();
        assert!(matches!(
            temperature_summary(&mut store, "2099-01-01", None),
            Err(ClimateError::NoMatchingRange)
        ));
        assert!(matches!(
            temperature_summary(&mut store, "2017-08-23", Some("2017-01-01")),
            Err(ClimateError::NoMatchingRange)
        ));
    }

    #[test]
    fn test_zero_temperature_is_a_real_result() {
        let mut store = MemoryStore::new(
            vec![station("A")],
            vec![measurement(1, "A", "2017-01-01", Some(0.0), 0.0)],
        );
        let summary = temperature_summary(&mut store, "2017-01-01", Some("2017-01-01")).unwrap();
        assert_eq!((summary.tmin, summary.tavg, summary.tmax), (0.0, 0.0, 0.0));
    }
}
