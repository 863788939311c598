/// Aggregations behind the API routes.
///
/// Submodules:
/// - `window` — the trailing 365-day "last 12 months" window.
/// - `series` — precipitation series, most-active-station temperatures,
///   and min/avg/max summaries over a date range.

pub mod series;
pub mod window;
