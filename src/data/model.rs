use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime};

// ---------------------------------------------------------------------------
// SiteRecord – one catalog row
// ---------------------------------------------------------------------------

/// A monitoring site from the catalog. `code` is the unique identifier
/// and doubles as the file-name key for the site's time-series CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub name: String,
    pub code: String,
    pub longitude: f64,
    pub latitude: f64,
}

// ---------------------------------------------------------------------------
// LayerGroup – togglable marker groups
// ---------------------------------------------------------------------------

/// Which togglable map layer a marker belongs to. Membership is a tag on
/// the marker and survives visibility toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerGroup {
    Water,
    Air,
    Unavailable,
}

impl LayerGroup {
    pub const ALL: [LayerGroup; 3] = [LayerGroup::Water, LayerGroup::Air, LayerGroup::Unavailable];

    /// Classify a site. Sites without a data file are grouped as
    /// `Unavailable` regardless of their code; air-temperature sites are
    /// recognized by an `AIR` marker in the site code.
    pub fn classify(code: &str, data_available: bool) -> Self {
        if !data_available {
            LayerGroup::Unavailable
        } else if code.contains("AIR") {
            LayerGroup::Air
        } else {
            LayerGroup::Water
        }
    }
}

impl fmt::Display for LayerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerGroup::Water => write!(f, "Water sites"),
            LayerGroup::Air => write!(f, "Air sites"),
            LayerGroup::Unavailable => write!(f, "No data"),
        }
    }
}

// ---------------------------------------------------------------------------
// Marker – a placed site with its layer tag
// ---------------------------------------------------------------------------

/// A site placed on the map. Built once per catalog load, after the
/// existence probe has decided the layer group.
#[derive(Debug, Clone)]
pub struct Marker {
    pub site: SiteRecord,
    pub group: LayerGroup,
}

impl Marker {
    /// Whether clicking this marker should attempt a time-series load.
    pub fn data_available(&self) -> bool {
        self.group != LayerGroup::Unavailable
    }
}

// ---------------------------------------------------------------------------
// ObservationRow / SiteTimeSeries – one site's loaded data
// ---------------------------------------------------------------------------

/// A single temperature observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
}

/// The parsed time series for one site, with the distinct calendar years
/// pre-computed for the year selector.
#[derive(Debug, Clone)]
pub struct SiteTimeSeries {
    pub site_code: String,
    /// All parsed rows in file order.
    pub rows: Vec<ObservationRow>,
    /// Distinct years present, duplicates collapsed, most recent first.
    pub years: Vec<i32>,
}

impl SiteTimeSeries {
    /// Build the year index from the loaded rows.
    pub fn from_rows(site_code: impl Into<String>, rows: Vec<ObservationRow>) -> Self {
        let year_set: BTreeSet<i32> = rows.iter().map(|r| r.timestamp.year()).collect();
        let years: Vec<i32> = year_set.into_iter().rev().collect();
        SiteTimeSeries {
            site_code: site_code.into(),
            rows,
            years,
        }
    }

    /// The year shown when the site is first opened.
    pub fn default_year(&self) -> Option<i32> {
        self.years.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(y: i32, m: u32, d: u32, temp: f64) -> ObservationRow {
        ObservationRow {
            timestamp: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            temperature_c: temp,
        }
    }

    #[test]
    fn years_are_distinct_and_descending() {
        let series = SiteTimeSeries::from_rows(
            "KLA",
            vec![row(2020, 1, 1, 4.0), row(2021, 6, 1, 18.5), row(2020, 7, 3, 21.0)],
        );
        assert_eq!(series.years, vec![2021, 2020]);
        assert_eq!(series.default_year(), Some(2021));
    }

    #[test]
    fn empty_series_has_no_default_year() {
        let series = SiteTimeSeries::from_rows("KLA", Vec::new());
        assert!(series.years.is_empty());
        assert_eq!(series.default_year(), None);
    }

    #[test]
    fn classify_by_code_and_availability() {
        assert_eq!(LayerGroup::classify("SF-AIR1", true), LayerGroup::Air);
        assert_eq!(LayerGroup::classify("SF1", true), LayerGroup::Water);
        // The probe result wins over the code.
        assert_eq!(LayerGroup::classify("SF-AIR1", false), LayerGroup::Unavailable);
    }
}
