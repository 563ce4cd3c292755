use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use thiserror::Error;

use super::model::{ObservationRow, SiteRecord, SiteTimeSeries};

// ---------------------------------------------------------------------------
// Column names and timestamp formats
// ---------------------------------------------------------------------------

/// Catalog columns, in positional order for headerless files.
pub const CATALOG_COLUMNS: [&str; 4] = ["name", "code", "longitude", "latitude"];

/// Per-site CSV columns (extra columns are ignored).
pub const TIMESTAMP_COLUMN: &str = "DateTime";
pub const TEMPERATURE_COLUMN: &str = "TempC";

/// Accepted timestamp formats, tried in order. Date-only rows are read
/// as midnight.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while reading the catalog or a site's data file.
///
/// A catalog error is fatal (nothing can render without it); a site error
/// only affects that site's window. Malformed rows are not errors: they
/// are skipped and logged with their row index.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read site catalog {}: {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("site catalog {} is missing required column '{column}'", .path.display())]
    CatalogColumns { path: PathBuf, column: &'static str },
    #[error("site {code}: failed to read {}: {source}", .path.display())]
    SiteRead {
        code: String,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("site {code}: {} is missing required column '{column}'", .path.display())]
    SiteColumns {
        code: String,
        path: PathBuf,
        column: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Site catalog
// ---------------------------------------------------------------------------

/// Load the site catalog. Rows with missing or unparseable coordinates
/// are skipped and logged; failure to read the file itself is fatal.
pub fn load_catalog(path: &Path, has_headers: bool) -> Result<Vec<SiteRecord>, DataError> {
    let reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_path(path)
        .map_err(|source| DataError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
    parse_catalog(reader, has_headers, path)
}

fn parse_catalog<R: io::Read>(
    mut reader: csv::Reader<R>,
    has_headers: bool,
    path: &Path,
) -> Result<Vec<SiteRecord>, DataError> {
    let columns: [usize; 4] = if has_headers {
        let headers = reader.headers().map_err(|source| DataError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut indices = [0usize; 4];
        for (slot, column) in indices.iter_mut().zip(CATALOG_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| DataError::CatalogColumns {
                    path: path.to_path_buf(),
                    column,
                })?;
        }
        indices
    } else {
        [0, 1, 2, 3]
    };
    let [name_idx, code_idx, lon_idx, lat_idx] = columns;

    let mut sites = Vec::new();
    let mut seen_codes: BTreeSet<String> = BTreeSet::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping catalog row {row_no}: {e}");
                continue;
            }
        };

        let code = record.get(code_idx).unwrap_or("").trim();
        if code.is_empty() {
            log::warn!("Skipping catalog row {row_no}: empty site code");
            continue;
        }

        let longitude = parse_coordinate(record.get(lon_idx));
        let latitude = parse_coordinate(record.get(lat_idx));
        let (Some(longitude), Some(latitude)) = (longitude, latitude) else {
            log::warn!("Skipping catalog row {row_no} ({code}): missing or invalid coordinates");
            continue;
        };

        if !seen_codes.insert(code.to_string()) {
            log::warn!("Skipping catalog row {row_no}: duplicate site code {code}");
            continue;
        }

        let name = record.get(name_idx).unwrap_or("").trim();
        sites.push(SiteRecord {
            // Headerless legacy catalogs may omit the display name.
            name: if name.is_empty() { code.to_string() } else { name.to_string() },
            code: code.to_string(),
            longitude,
            latitude,
        });
    }

    Ok(sites)
}

fn parse_coordinate(field: Option<&str>) -> Option<f64> {
    let text = field?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Per-site time series
// ---------------------------------------------------------------------------

/// The per-site resource path is derived deterministically from the code.
pub fn site_data_path(sites_dir: &Path, code: &str) -> PathBuf {
    sites_dir.join(format!("{code}.csv"))
}

/// Existence probe: decides marker styling and grouping without reading
/// the file.
pub fn probe_site_data(sites_dir: &Path, code: &str) -> bool {
    site_data_path(sites_dir, code).is_file()
}

/// Load and parse one site's time series.
pub fn load_site_series(sites_dir: &Path, code: &str) -> Result<SiteTimeSeries, DataError> {
    let path = site_data_path(sites_dir, code);
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&path)
        .map_err(|source| DataError::SiteRead {
            code: code.to_string(),
            path: path.clone(),
            source,
        })?;
    parse_series(reader, code, &path)
}

fn parse_series<R: io::Read>(
    mut reader: csv::Reader<R>,
    code: &str,
    path: &Path,
) -> Result<SiteTimeSeries, DataError> {
    let headers = reader.headers().map_err(|source| DataError::SiteRead {
        code: code.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let column_index = |column: &'static str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| DataError::SiteColumns {
                code: code.to_string(),
                path: path.to_path_buf(),
                column,
            })
    };
    let ts_idx = column_index(TIMESTAMP_COLUMN)?;
    let temp_idx = column_index(TEMPERATURE_COLUMN)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{code}: skipping row {row_no}: {e}");
                continue;
            }
        };

        let Some(timestamp) = record.get(ts_idx).and_then(parse_timestamp) else {
            log::warn!("{code}: skipping row {row_no}: unparseable timestamp");
            continue;
        };
        let Some(temperature_c) = record.get(temp_idx).and_then(|v| v.trim().parse::<f64>().ok())
        else {
            log::warn!("{code}: skipping row {row_no}: unparseable temperature");
            continue;
        };

        rows.push(ObservationRow {
            timestamp,
            temperature_c,
        });
    }

    Ok(SiteTimeSeries::from_rows(code, rows))
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(text, DATE_ONLY_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_reader(text: &str, has_headers: bool) -> csv::Reader<&[u8]> {
        ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(text.as_bytes())
    }

    const CATALOG: &str = "\
name,code,longitude,latitude
Site A,A1,-123.2,41.3
Site B,B2,,41.1
Site C,C3,-123.25,not-a-number
Site A again,A1,-123.3,41.4
Salmon Forks Air,SF-AIR1,-123.31,41.24
";

    #[test]
    fn catalog_skips_rows_without_coordinates() {
        let sites =
            parse_catalog(csv_reader(CATALOG, true), true, Path::new("sites.csv")).unwrap();
        let codes: Vec<&str> = sites.iter().map(|s| s.code.as_str()).collect();
        // B2 has no longitude, C3 an invalid latitude, and the second A1
        // is a duplicate code.
        assert_eq!(codes, vec!["A1", "SF-AIR1"]);
        assert_eq!(sites[0].name, "Site A");
        assert_eq!(sites[0].longitude, -123.2);
        assert_eq!(sites[0].latitude, 41.3);
    }

    #[test]
    fn headerless_catalog_uses_positional_columns() {
        let text = "Site A,A1,-123.2,41.3\n,B2,-123.1,41.1\n";
        let sites = parse_catalog(csv_reader(text, false), false, Path::new("sites.csv"))
            .unwrap();
        assert_eq!(sites.len(), 2);
        // A blank name falls back to the code.
        assert_eq!(sites[1].name, "B2");
    }

    #[test]
    fn catalog_with_renamed_columns_is_fatal() {
        let text = "station,code,lon,lat\nSite A,A1,-123.2,41.3\n";
        let err = parse_catalog(csv_reader(text, true), true, Path::new("sites.csv"))
            .unwrap_err();
        assert!(matches!(err, DataError::CatalogColumns { column: "name", .. }));
    }

    const SERIES: &str = "\
DateTime,TempC,Flag
2020-07-01 00:00:00,14.2,ok
2020-07-01 06:00:00,13.1,ok
yesterday,12.0,ok
2021-01-15 12:00:00,nan-but-worse,ok
2021-06-01T18:30:00,21.7,ok
2021-06-02,19.9,ok
";

    #[test]
    fn series_parses_rows_and_derives_years() {
        let reader = csv_reader(SERIES, true);
        let series = parse_series(reader, "A1", Path::new("A1.csv")).unwrap();
        // Two malformed rows are skipped, the rest parse (including the
        // ISO-T and date-only variants).
        assert_eq!(series.rows.len(), 4);
        assert_eq!(series.years, vec![2021, 2020]);
        assert_eq!(series.default_year(), Some(2021));
        assert_eq!(series.rows[0].temperature_c, 14.2);
    }

    #[test]
    fn series_without_temperature_column_is_an_error() {
        let reader = csv_reader("DateTime,WaterLevel\n2020-07-01 00:00:00,2.4\n", true);
        let err = parse_series(reader, "A1", Path::new("A1.csv")).unwrap_err();
        assert!(matches!(err, DataError::SiteColumns { column: "TempC", .. }));
    }

    #[test]
    fn site_path_is_derived_from_the_code() {
        assert_eq!(
            site_data_path(Path::new("data/sites"), "SF-AIR1"),
            Path::new("data/sites/SF-AIR1.csv")
        );
    }
}
