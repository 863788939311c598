/// CSV parsing for the climate dataset export.
///
/// The dataset ships as two files:
///
/// ```text
/// hawaii_stations.csv      station,name,latitude,longitude,elevation
/// hawaii_measurements.csv  station,date,prcp,tobs
/// ```
///
/// Station names contain commas, so fields may be double-quoted. Empty
/// `prcp` cells are missing readings. Measurement ids are assigned from row
/// order, starting at 1. Columns are located by header name.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::{DATE_FORMAT, Measurement, Station};
use crate::store::MemoryStore;

pub const STATIONS_FILE: &str = "hawaii_stations.csv";
pub const MEASUREMENTS_FILE: &str = "hawaii_measurements.csv";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: missing column '{column}' in header")]
    MissingColumn { file: &'static str, column: &'static str },

    #[error("{file} line {line}: {message}")]
    InvalidRow {
        file: &'static str,
        line: usize,
        message: String,
    },

    #[error("Measurement {id} references unknown station '{station}'")]
    UnknownStation { id: i32, station: String },
}

/// Splits one CSV line into fields, honouring double quotes and `""` escapes.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
}

/// Header row plus data rows (with 1-based line numbers), blank lines skipped.
fn rows(contents: &str) -> Option<(Vec<String>, Vec<(usize, Vec<String>)>)> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next()?;
    let header = split_csv_line(header).into_iter().map(|h| h.trim().to_string()).collect();
    let data = lines.map(|(n, l)| (n, split_csv_line(l))).collect();

    Some((header, data))
}

/// Column index lookup against a header row.
struct Columns<'a> {
    file: &'static str,
    header: &'a [String],
}

impl Columns<'_> {
    fn index(&self, column: &'static str) -> Result<usize, DatasetError> {
        self.header
            .iter()
            .position(|h| h == column)
            .ok_or(DatasetError::MissingColumn { file: self.file, column })
    }
}

fn field<'a>(file: &'static str, line: usize, row: &'a [String], idx: usize) -> Result<&'a str, DatasetError> {
    row.get(idx)
        .map(|f| f.trim())
        .ok_or_else(|| DatasetError::InvalidRow {
            file,
            line,
            message: format!("expected at least {} fields, found {}", idx + 1, row.len()),
        })
}

fn number(file: &'static str, line: usize, name: &str, value: &str) -> Result<f64, DatasetError> {
    value.parse().map_err(|_| DatasetError::InvalidRow {
        file,
        line,
        message: format!("{} '{}' is not a number", name, value),
    })
}

/// Parses the stations export.
pub fn parse_stations(contents: &str) -> Result<Vec<Station>, DatasetError> {
    let file = STATIONS_FILE;
    let Some((header, data)) = rows(contents) else {
        return Ok(Vec::new());
    };

    let cols = Columns { file, header: &header };
    let (station_i, name_i) = (cols.index("station")?, cols.index("name")?);
    let (lat_i, lon_i, elev_i) = (cols.index("latitude")?, cols.index("longitude")?, cols.index("elevation")?);

    let mut seen = HashSet::new();
    let mut stations = Vec::with_capacity(data.len());

    for (line, row) in data {
        let code = field(file, line, &row, station_i)?;
        if code.is_empty() || !seen.insert(code.to_string()) {
            return Err(DatasetError::InvalidRow {
                file,
                line,
                message: format!("station code '{}' is empty or duplicated", code),
            });
        }

        stations.push(Station {
            station: code.to_string(),
            name: field(file, line, &row, name_i)?.to_string(),
            latitude: number(file, line, "latitude", field(file, line, &row, lat_i)?)?,
            longitude: number(file, line, "longitude", field(file, line, &row, lon_i)?)?,
            elevation: number(file, line, "elevation", field(file, line, &row, elev_i)?)?,
        });
    }

    Ok(stations)
}

/// Parses the measurements export. Dates must be `YYYY-MM-DD`; anything
/// else would break text ordering in the store.
pub fn parse_measurements(contents: &str) -> Result<Vec<Measurement>, DatasetError> {
    let file = MEASUREMENTS_FILE;
    let Some((header, data)) = rows(contents) else {
        return Ok(Vec::new());
    };

    let cols = Columns { file, header: &header };
    let (station_i, date_i) = (cols.index("station")?, cols.index("date")?);
    let (prcp_i, tobs_i) = (cols.index("prcp")?, cols.index("tobs")?);

    let mut measurements = Vec::with_capacity(data.len());

    for (line, row) in data {
        let date = field(file, line, &row, date_i)?;
        if date.len() != 10 || NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return Err(DatasetError::InvalidRow {
                file,
                line,
                message: format!("date '{}' is not YYYY-MM-DD", date),
            });
        }

        let prcp = match field(file, line, &row, prcp_i)? {
            "" => None,
            value => {
                let prcp = number(file, line, "prcp", value)?;
                if prcp < 0.0 {
                    return Err(DatasetError::InvalidRow {
                        file,
                        line,
                        message: format!("prcp {} is negative", prcp),
                    });
                }
                Some(prcp)
            }
        };

        measurements.push(Measurement {
            id: measurements.len() as i32 + 1,
            station: field(file, line, &row, station_i)?.to_string(),
            date: date.to_string(),
            prcp,
            tobs: number(file, line, "tobs", field(file, line, &row, tobs_i)?)?,
        });
    }

    Ok(measurements)
}

/// Every measurement must reference a known station.
pub fn check_station_references(stations: &[Station], measurements: &[Measurement]) -> Result<(), DatasetError> {
    let known: HashSet<&str> = stations.iter().map(|s| s.station.as_str()).collect();

    match measurements.iter().find(|m| !known.contains(m.station.as_str())) {
        Some(m) => Err(DatasetError::UnknownStation {
            id: m.id,
            station: m.station.clone(),
        }),
        None => Ok(()),
    }
}

fn read(dir: &Path, name: &str) -> Result<String, DatasetError> {
    let path = dir.join(name);
    fs::read_to_string(&path).map_err(|source| DatasetError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Reads and validates both files from `dir`.
pub fn load_dir(dir: &Path) -> Result<(Vec<Station>, Vec<Measurement>), DatasetError> {
    let stations = parse_stations(&read(dir, STATIONS_FILE)?)?;
    let measurements = parse_measurements(&read(dir, MEASUREMENTS_FILE)?)?;
    check_station_references(&stations, &measurements)?;

    Ok((stations, measurements))
}

/// Loads `dir` into an in-memory store.
pub fn load_memory_store(dir: &Path) -> Result<MemoryStore, DatasetError> {
    let (stations, measurements) = load_dir(dir)?;
    Ok(MemoryStore::new(stations, measurements))
}
