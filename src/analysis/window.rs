/// Trailing window computation.
///
/// The "last 12 months" is a fixed offset of `WINDOW_DAYS` back from the
/// latest observation date. It does not follow calendar months, so a window
/// that crosses Feb 29 covers one day less than a calendar year.

use chrono::{Duration, NaiveDate};

use crate::error::{ClimateError, Result};
use crate::model::{DATE_FORMAT, WINDOW_DAYS};
use crate::store::ClimateStore;

/// First date (inclusive) of the window ending at `latest`.
pub fn window_start(latest: &str) -> Result<String> {
    let latest = NaiveDate::parse_from_str(latest, DATE_FORMAT)
        .map_err(|_| ClimateError::MalformedStoredDate(latest.to_string()))?;

    Ok((latest - Duration::days(WINDOW_DAYS)).format(DATE_FORMAT).to_string())
}

/// Window start for the dataset behind `store`.
pub fn last_twelve_months_start(store: &mut dyn ClimateStore) -> Result<String> {
    let latest = store.max_date()?;
    window_start(&latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::tests::sample_store;

    #[test]
    fn test_window_start_is_365_days_back() {
        assert_eq!(window_start("2017-08-23").unwrap(), "2016-08-23");
    }

    #[test]
    fn test_window_across_leap_day() {
        // 2016-02-29 falls inside the window, so it starts a day after Mar 1
        assert_eq!(window_start("2016-03-01").unwrap(), "2015-03-02");
    }

    #[test]
    fn test_malformed_stored_date_is_rejected() {
        let err = window_start("08/23/2017").unwrap_err();
        assert!(matches!(err, ClimateError::MalformedStoredDate(ref d) if d == "08/23/2017"));
    }

    #[test]
    fn test_window_from_store() {
        let mut store = sample_store();
        assert_eq!(last_twelve_months_start(&mut store).unwrap(), "2016-08-23");
    }
}
