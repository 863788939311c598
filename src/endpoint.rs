/// HTTP endpoint for the climate API
///
/// Serves the fixed set of read-only routes over the dataset. Requests are
/// handed to a worker pool; each data route opens its own store session and
/// releases it before the response is sent.
///
/// Endpoints:
/// - GET / - HTML route index
/// - GET /api/v1.0/precipitation - date → precipitation, last 12 months
/// - GET /api/v1.0/stations - station codes
/// - GET /api/v1.0/tobs - most active station temperatures, last 12 months
/// - GET /api/v1.0/{start} - TMIN/TAVG/TMAX from start onwards
/// - GET /api/v1.0/{start}/{end} - TMIN/TAVG/TMAX for start..=end
/// - GET /health - Service health check

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use threadpool::ThreadPool;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::analysis::series;
use crate::config::ServiceConfig;
use crate::error::{ClimateError, Result};
use crate::model::DATE_FORMAT;
use crate::session::{Session, SessionFactory};

const API_PREFIX: &str = "/api/v1.0/";

const INDEX_HTML: &str = "<h1>Welcome to the Climate Analysis API</h1>\
<p>Available Routes:</p>\
<ul>\
<li>/api/v1.0/precipitation - Retrieve the last 12 months of precipitation data as JSON</li>\
<li>/api/v1.0/stations - Get a list of all weather observation stations as JSON</li>\
<li>/api/v1.0/tobs - Retrieve the temperature observations (TOBS) for the most active station for the last 12 months</li>\
<li>/api/v1.0/&lt;start&gt; - Replace &lt;start&gt; with a date (YYYY-MM-DD) to get TMIN, TAVG, and TMAX for all dates after the start date</li>\
<li>/api/v1.0/&lt;start&gt;/&lt;end&gt; - Replace &lt;start&gt; and &lt;end&gt; with dates (YYYY-MM-DD) to get TMIN, TAVG, and TMAX for the date range (inclusive)</li>\
</ul>";

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/{start}",
    "/api/v1.0/{start}/{end}",
    "/health",
];

// ---------------------------------------------------------------------------
// Application Context
// ---------------------------------------------------------------------------

/// Process-wide state shared by every request handler.
pub struct AppContext {
    pub config: ServiceConfig,
    pub sessions: Box<dyn SessionFactory>,
}

impl AppContext {
    pub fn new(config: ServiceConfig, sessions: impl SessionFactory + 'static) -> Self {
        Self {
            config,
            sessions: Box::new(sessions),
        }
    }

    fn open_session(&self) -> Result<Session> {
        Session::open(self.sessions.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Route {
    Index,
    Health,
    Precipitation,
    Stations,
    Tobs,
    TemperatureRange { start: String, end: Option<String> },
}

/// Maps a request path (query string already removed) to a route.
fn parse_route(path: &str) -> Option<Route> {
    match path {
        "/" => return Some(Route::Index),
        "/health" => return Some(Route::Health),
        _ => {}
    }

    let rest = path.strip_prefix(API_PREFIX)?;
    match rest {
        "precipitation" => return Some(Route::Precipitation),
        "stations" => return Some(Route::Stations),
        "tobs" => return Some(Route::Tobs),
        _ => {}
    }

    let segments: Vec<&str> = rest.split('/').collect();
    let (start, end) = match segments.as_slice() {
        [start] => (*start, None),
        [start, end] => (*start, Some(*end)),
        _ => return None,
    };

    let start = decode_segment(start)?;
    let end = match end {
        Some(end) => Some(decode_segment(end)?),
        None => None,
    };

    Some(Route::TemperatureRange { start, end })
}

/// Percent-decodes a non-empty path segment.
fn decode_segment(segment: &str) -> Option<String> {
    if segment.is_empty() {
        return None;
    }
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

/// Strict `YYYY-MM-DD` check used when `strict_date_validation` is on.
fn validate_date(value: &str) -> Result<()> {
    let well_formed = value.len() == 10 && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(ClimateError::MalformedDateInput(value.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A fully rendered response, independent of the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                log::error!("Failed to serialize response: {}", e);
                Self::error_body(500, "Internal server error")
            }
        }
    }

    fn error_body(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::json!({ "Error": message }).to_string(),
        }
    }

    fn from_error(err: &ClimateError) -> Self {
        if err.status_code() >= 500 {
            log::error!("Request failed: {}", err);
        }
        Self::error_body(err.status_code(), &err.public_message())
    }

    /// Body parsed as JSON; convenience for callers and tests.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }

    fn into_http(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body.into_bytes())
            .with_status_code(StatusCode::from(self.status));

        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            response = response.with_header(header);
        }
        response
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Handles one request. Pure with respect to the HTTP server so routes can be
/// exercised without a socket.
pub fn handle_request(ctx: &AppContext, method: &Method, url: &str) -> ApiResponse {
    let path = url.split('?').next().unwrap_or(url);

    let Some(route) = parse_route(path) else {
        return ApiResponse::json(
            404,
            &serde_json::json!({
                "Error": "Not found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        );
    };

    if *method != Method::Get {
        return ApiResponse::error_body(405, "Method not allowed");
    }

    let result = match route {
        Route::Index => return ApiResponse::html(INDEX_HTML),
        Route::Health => return handle_health(),
        Route::Precipitation => handle_precipitation(ctx),
        Route::Stations => handle_stations(ctx),
        Route::Tobs => handle_tobs(ctx),
        Route::TemperatureRange { start, end } => handle_temperature_range(ctx, &start, end.as_deref()),
    };

    result.unwrap_or_else(|e| ApiResponse::from_error(&e))
}

/// Handle /health endpoint
fn handle_health() -> ApiResponse {
    ApiResponse::json(
        200,
        &serde_json::json!({
            "status": "ok",
            "service": "climate_api",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

fn handle_precipitation(ctx: &AppContext) -> Result<ApiResponse> {
    let mut session = ctx.open_session()?;
    let series = series::precipitation_series(&mut *session)?;
    Ok(ApiResponse::json(200, &series))
}

fn handle_stations(ctx: &AppContext) -> Result<ApiResponse> {
    let mut session = ctx.open_session()?;
    let codes = session.all_station_codes()?;
    Ok(ApiResponse::json(200, &codes))
}

fn handle_tobs(ctx: &AppContext) -> Result<ApiResponse> {
    let mut session = ctx.open_session()?;
    let observations = series::most_active_station_temperatures(&mut *session)?;
    Ok(ApiResponse::json(200, &observations))
}

fn handle_temperature_range(ctx: &AppContext, start: &str, end: Option<&str>) -> Result<ApiResponse> {
    log::debug!("Start Date: {}", start);
    if let Some(end) = end {
        log::debug!("End Date: {}", end);
    }

    if ctx.config.strict_date_validation {
        validate_date(start)?;
        if let Some(end) = end {
            validate_date(end)?;
        }
    }

    let mut session = ctx.open_session()?;
    let summary = series::temperature_summary(&mut *session, start, end)?;
    Ok(ApiResponse::json(200, &summary))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the configured address. Blocks for the
/// lifetime of the listener.
pub fn start_endpoint_server(ctx: Arc<AppContext>) -> std::result::Result<(), String> {
    let addr = ctx.config.listen_addr();
    let server = tiny_http::Server::http(&addr)
        .map_err(|e| format!("Failed to start HTTP server on {}: {}", addr, e))?;

    let pool = ThreadPool::new(ctx.config.worker_threads);

    log::info!("HTTP endpoint listening on http://{}", addr);
    for endpoint in AVAILABLE_ENDPOINTS {
        log::info!("   GET {}", endpoint);
    }

    for request in server.incoming_requests() {
        let ctx = Arc::clone(&ctx);
        pool.execute(move || serve(&ctx, request));
    }

    pool.join();
    Ok(())
}

fn serve(ctx: &AppContext, request: Request) {
    let response = handle_request(ctx, request.method(), request.url());
    log::info!("{} {} -> {}", request.method(), request.url(), response.status);

    if let Err(e) = request.respond(response.into_http()) {
        log::warn!("Failed to send response: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::tests::sample_store;
    use crate::store::{ClimateStore, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context(strict: bool) -> AppContext {
        let config = ServiceConfig {
            strict_date_validation: strict,
            ..ServiceConfig::default()
        };
        AppContext::new(config, sample_store())
    }

    fn get(ctx: &AppContext, url: &str) -> ApiResponse {
        handle_request(ctx, &Method::Get, url)
    }

    #[test]
    fn test_parse_named_routes_take_precedence() {
        assert_eq!(parse_route("/api/v1.0/stations"), Some(Route::Stations));
        assert_eq!(parse_route("/api/v1.0/tobs"), Some(Route::Tobs));
        assert_eq!(parse_route("/api/v1.0/precipitation"), Some(Route::Precipitation));
    }

    #[test]
    fn test_parse_date_segments() {
        assert_eq!(
            parse_route("/api/v1.0/2017-01-01"),
            Some(Route::TemperatureRange { start: "2017-01-01".into(), end: None })
        );
        assert_eq!(
            parse_route("/api/v1.0/2017-01-01/2017-01-31"),
            Some(Route::TemperatureRange { start: "2017-01-01".into(), end: Some("2017-01-31".into()) })
        );
        assert_eq!(
            parse_route("/api/v1.0/Jan%201"),
            Some(Route::TemperatureRange { start: "Jan 1".into(), end: None })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_shapes() {
        assert_eq!(parse_route("/api/v1.0/"), None);
        assert_eq!(parse_route("/api/v1.0/2017-01-01/"), None);
        assert_eq!(parse_route("/api/v1.0/a/b/c"), None);
        assert_eq!(parse_route("/api/v2.0/stations"), None);
        assert_eq!(parse_route("/stations"), None);
    }

    #[test]
    fn test_index_is_html_listing_routes() {
        let response = get(&context(false), "/");
        assert_eq!(response.status, 200);
        assert!(response.content_type.starts_with("text/html"));
        assert!(response.body.contains("/api/v1.0/precipitation"));
        assert!(response.body.contains("/api/v1.0/&lt;start&gt;/&lt;end&gt;"));
    }

    #[test]
    fn test_unknown_path_is_404_with_endpoints() {
        let response = get(&context(false), "/nope");
        assert_eq!(response.status, 404);
        let json = response.json_body().unwrap();
        assert_eq!(json["Error"], "Not found");
        assert!(json["available_endpoints"].as_array().unwrap().len() >= 6);
    }

    #[test]
    fn test_non_get_is_405() {
        let response = handle_request(&context(false), &Method::Post, "/api/v1.0/stations");
        assert_eq!(response.status, 405);
    }

    #[test]
    fn test_query_string_is_ignored() {
        let ctx = context(false);
        assert_eq!(get(&ctx, "/api/v1.0/stations?x=1"), get(&ctx, "/api/v1.0/stations"));
    }

    #[test]
    fn test_health() {
        let json = get(&context(false), "/health").json_body().unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "climate_api");
    }

    #[test]
    fn test_lenient_mode_malformed_date_is_404() {
        let response = get(&context(false), "/api/v1.0/not-a-date");
        assert_eq!(response.status, 404);
        assert_eq!(
            response.json_body().unwrap()["Error"],
            "No data found for the specified date range. Please check your input."
        );
    }

    #[test]
    fn test_strict_mode_malformed_date_is_400() {
        let ctx = context(true);
        assert_eq!(get(&ctx, "/api/v1.0/not-a-date").status, 400);
        assert_eq!(get(&ctx, "/api/v1.0/2017-01-01/2017-02-30").status, 400);
        assert_eq!(get(&ctx, "/api/v1.0/2017-1-1").status, 400);
        // Well-formed dates with no data keep their 404
        assert_eq!(get(&ctx, "/api/v1.0/2099-01-01").status, 404);
        assert_eq!(get(&ctx, "/api/v1.0/2017-01-01").status, 200);
    }

    #[test]
    fn test_empty_dataset_is_500_without_details() {
        let ctx = AppContext::new(ServiceConfig::default(), MemoryStore::new(vec![], vec![]));
        for url in ["/api/v1.0/precipitation", "/api/v1.0/tobs"] {
            let response = get(&ctx, url);
            assert_eq!(response.status, 500, "{}", url);
            assert_eq!(response.json_body().unwrap()["Error"], "Internal server error");
        }
        assert_eq!(get(&ctx, "/api/v1.0/stations").body.replace(char::is_whitespace, ""), "[]");
    }

    /// Counts sessions opened and released through a wrapped memory store.
    struct CountingFactory {
        inner: MemoryStore,
        opened: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    struct CountingStore {
        inner: MemoryStore,
        released: Arc<AtomicUsize>,
    }

    impl Drop for CountingStore {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl ClimateStore for CountingStore {
        fn max_date(&mut self) -> Result<String> {
            self.inner.max_date()
        }
        fn precipitation_since(&mut self, since: &str) -> Result<Vec<(String, Option<f64>)>> {
            self.inner.precipitation_since(since)
        }
        fn all_station_codes(&mut self) -> Result<Vec<String>> {
            self.inner.all_station_codes()
        }
        fn most_active_station(&mut self) -> Result<String> {
            self.inner.most_active_station()
        }
        fn temperatures_for_station_since(&mut self, station: &str, since: &str) -> Result<Vec<(String, f64)>> {
            self.inner.temperatures_for_station_since(station, since)
        }
        fn temperature_stats_in_range(&mut self, start: &str, end: Option<&str>) -> Result<crate::model::TemperatureStats> {
            self.inner.temperature_stats_in_range(start, end)
        }
    }

    impl SessionFactory for CountingFactory {
        fn open_store(&self) -> Result<Box<dyn ClimateStore>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingStore {
                inner: self.inner.clone(),
                released: Arc::clone(&self.released),
            }))
        }
    }

    #[test]
    fn test_every_data_request_releases_its_session() {
        let opened = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let ctx = AppContext::new(
            ServiceConfig::default(),
            CountingFactory {
                inner: sample_store(),
                opened: Arc::clone(&opened),
                released: Arc::clone(&released),
            },
        );

        // Success and failure paths alike
        for url in [
            "/api/v1.0/precipitation",
            "/api/v1.0/stations",
            "/api/v1.0/tobs",
            "/api/v1.0/2017-01-01",
            "/api/v1.0/2099-01-01",
        ] {
            get(&ctx, url);
        }

        assert_eq!(opened.load(Ordering::SeqCst), 5);
        assert_eq!(released.load(Ordering::SeqCst), 5);
    }
}
