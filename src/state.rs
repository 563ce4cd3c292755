use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::config::AppConfig;
use crate::data::filter::year_points;
use crate::data::loader::{self, DataError};
use crate::data::model::{LayerGroup, Marker, SiteRecord, SiteTimeSeries};

// ---------------------------------------------------------------------------
// Per-site view state
// ---------------------------------------------------------------------------

/// Display state for one loaded site: the series, the selected year, and
/// the chart-ready points for it. Each open window owns one of these, so
/// concurrent windows never clobber each other's selection.
pub struct SeriesView {
    pub series: SiteTimeSeries,
    /// `None` means the file held no parseable observations.
    pub selected_year: Option<i32>,
    pub points: Vec<[f64; 2]>,
}

impl SeriesView {
    /// Points for the default (most recent) year are computed up front,
    /// so opening a site needs no second pass over the file.
    pub fn new(series: SiteTimeSeries) -> Self {
        let selected_year = series.default_year();
        let points = selected_year
            .map(|year| year_points(&series.rows, year))
            .unwrap_or_default();
        SeriesView {
            series,
            selected_year,
            points,
        }
    }

    /// Re-filter for a newly selected year. The loaded rows and the year
    /// list stay untouched; no re-read happens.
    pub fn select_year(&mut self, year: i32) {
        if self.selected_year == Some(year) {
            return;
        }
        self.selected_year = Some(year);
        self.points = year_points(&self.series.rows, year);
    }
}

/// Lifecycle of a site window's data.
pub enum ViewPhase {
    /// A background load is in flight; the receiver is this window's.
    Loading(Receiver<Result<SiteTimeSeries, DataError>>),
    Ready(SeriesView),
    /// The existence probe reported no data file; no load was attempted.
    Unavailable,
    Failed(String),
}

/// One open site window.
pub struct SiteView {
    pub site: SiteRecord,
    pub open: bool,
    pub phase: ViewPhase,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,
    /// Markers built from the catalog (None until a catalog loads).
    pub markers: Option<Vec<Marker>>,
    /// Fatal catalog failure, shown instead of the map.
    pub catalog_error: Option<String>,
    /// Visibility per layer group; membership itself is never touched.
    pub layer_visibility: BTreeMap<LayerGroup, bool>,
    /// Open site windows, keyed by site code.
    pub views: BTreeMap<String, SiteView>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            markers: None,
            catalog_error: None,
            layer_visibility: LayerGroup::ALL.iter().map(|&g| (g, true)).collect(),
            views: BTreeMap::new(),
        }
    }
}

impl AppState {
    /// Build the state and load the configured catalog.
    pub fn new(config: AppConfig) -> Self {
        let mut state = AppState {
            config,
            ..AppState::default()
        };
        state.reload_catalog();
        state
    }

    /// (Re)load the catalog and probe each site's data file. The probe
    /// runs here, before any click handling is possible, so a marker's
    /// availability is always known when it becomes clickable.
    pub fn reload_catalog(&mut self) {
        self.views.clear();
        let path = self.config.catalog_path();
        match loader::load_catalog(&path, self.config.catalog_has_headers) {
            Ok(sites) => {
                let sites_dir = self.config.sites_dir();
                let markers: Vec<Marker> = sites
                    .into_iter()
                    .map(|site| {
                        let available = loader::probe_site_data(&sites_dir, &site.code);
                        let group = LayerGroup::classify(&site.code, available);
                        Marker { site, group }
                    })
                    .collect();
                log::info!("Loaded {} sites from {}", markers.len(), path.display());
                self.markers = Some(markers);
                self.catalog_error = None;
            }
            Err(e) => {
                log::error!("{e}");
                self.markers = None;
                self.catalog_error = Some(e.to_string());
            }
        }
    }

    pub fn layer_visible(&self, group: LayerGroup) -> bool {
        self.layer_visibility.get(&group).copied().unwrap_or(true)
    }

    /// Hide or show a whole group. Markers keep their group tag, so
    /// toggling back restores exactly the same set.
    pub fn toggle_layer(&mut self, group: LayerGroup) {
        let visible = self.layer_visibility.entry(group).or_insert(true);
        *visible = !*visible;
    }

    /// All markers belonging to a group, visible or not.
    pub fn group_markers(&self, group: LayerGroup) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .flatten()
            .filter(move |m| m.group == group)
    }

    /// Open (or re-focus) the window for the site with this code. For an
    /// unavailable marker no load is attempted; otherwise the series is
    /// read on a worker thread and delivered through the view's channel.
    pub fn open_site(&mut self, code: &str) {
        let Some(marker) = self
            .markers
            .iter()
            .flatten()
            .find(|m| m.site.code == code)
        else {
            return;
        };

        if let Some(view) = self.views.get_mut(code) {
            view.open = true;
            return;
        }

        let phase = if marker.data_available() {
            let (tx, rx) = mpsc::channel();
            let sites_dir = self.config.sites_dir();
            let site_code = marker.site.code.clone();
            thread::spawn(move || {
                let result = loader::load_site_series(&sites_dir, &site_code);
                // If the window was closed in the meantime the receiver is
                // gone and the result is discarded.
                let _ = tx.send(result);
            });
            ViewPhase::Loading(rx)
        } else {
            ViewPhase::Unavailable
        };

        self.views.insert(
            code.to_string(),
            SiteView {
                site: marker.site.clone(),
                open: true,
                phase,
            },
        );
    }

    /// Apply finished background loads and drop closed windows. Called
    /// once per frame before anything draws.
    pub fn poll_loads(&mut self) {
        for view in self.views.values_mut() {
            let ViewPhase::Loading(rx) = &view.phase else {
                continue;
            };
            match rx.try_recv() {
                Ok(Ok(series)) => {
                    log::info!(
                        "{}: loaded {} rows spanning {} year(s)",
                        view.site.code,
                        series.rows.len(),
                        series.years.len()
                    );
                    view.phase = ViewPhase::Ready(SeriesView::new(series));
                }
                Ok(Err(e)) => {
                    log::error!("{e}");
                    view.phase = ViewPhase::Failed(e.to_string());
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    view.phase = ViewPhase::Failed("loader thread stopped unexpectedly".to_string());
                }
            }
        }
        self.views.retain(|_, view| view.open);
    }

    /// Whether any window still waits on a background load.
    pub fn any_loading(&self) -> bool {
        self.views
            .values()
            .any(|v| matches!(v.phase, ViewPhase::Loading(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ObservationRow;
    use chrono::NaiveDate;

    fn row(y: i32, m: u32, d: u32, temp: f64) -> ObservationRow {
        ObservationRow {
            timestamp: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
            temperature_c: temp,
        }
    }

    fn marker(code: &str, group: LayerGroup) -> Marker {
        Marker {
            site: SiteRecord {
                name: code.to_string(),
                code: code.to_string(),
                longitude: -123.2,
                latitude: 41.3,
            },
            group,
        }
    }

    #[test]
    fn series_view_opens_on_the_most_recent_year() {
        let series = SiteTimeSeries::from_rows(
            "A1",
            vec![row(2020, 3, 1, 9.0), row(2021, 3, 1, 8.0), row(2021, 8, 1, 22.0)],
        );
        let view = SeriesView::new(series);
        assert_eq!(view.selected_year, Some(2021));
        assert_eq!(view.points.len(), 2);
    }

    #[test]
    fn selecting_a_year_refilters_without_touching_the_rows() {
        let series = SiteTimeSeries::from_rows(
            "A1",
            vec![row(2020, 3, 1, 9.0), row(2021, 3, 1, 8.0)],
        );
        let mut view = SeriesView::new(series);
        view.select_year(2020);
        assert_eq!(view.selected_year, Some(2020));
        assert_eq!(view.points, vec![[row(2020, 3, 1, 9.0).timestamp.and_utc().timestamp() as f64, 9.0]]);
        assert_eq!(view.series.rows.len(), 2);
        assert_eq!(view.series.years, vec![2021, 2020]);
    }

    #[test]
    fn toggling_a_layer_keeps_membership() {
        let mut state = AppState::default();
        state.markers = Some(vec![marker("A1", LayerGroup::Water)]);
        assert!(state.layer_visible(LayerGroup::Water));
        state.toggle_layer(LayerGroup::Water);
        assert!(!state.layer_visible(LayerGroup::Water));
        assert_eq!(state.group_markers(LayerGroup::Water).count(), 1);
        state.toggle_layer(LayerGroup::Water);
        assert!(state.layer_visible(LayerGroup::Water));
    }

    #[test]
    fn opening_an_unavailable_site_does_not_load() {
        let mut state = AppState::default();
        state.markers = Some(vec![marker("NORD", LayerGroup::Unavailable)]);
        state.open_site("NORD");
        let view = state.views.get("NORD").unwrap();
        assert!(matches!(view.phase, ViewPhase::Unavailable));
    }

    #[test]
    fn poll_applies_a_finished_load() {
        let mut state = AppState::default();
        let (tx, rx) = mpsc::channel();
        state.views.insert(
            "A1".to_string(),
            SiteView {
                site: marker("A1", LayerGroup::Water).site,
                open: true,
                phase: ViewPhase::Loading(rx),
            },
        );

        // Nothing delivered yet: still loading.
        state.poll_loads();
        assert!(matches!(state.views["A1"].phase, ViewPhase::Loading(_)));

        let series = SiteTimeSeries::from_rows("A1", vec![row(2021, 3, 1, 8.0)]);
        tx.send(Ok(series)).unwrap();
        state.poll_loads();
        match &state.views["A1"].phase {
            ViewPhase::Ready(view) => assert_eq!(view.selected_year, Some(2021)),
            _ => panic!("expected Ready"),
        }
    }

    #[test]
    fn closed_windows_are_dropped_on_poll() {
        let mut state = AppState::default();
        state.views.insert(
            "A1".to_string(),
            SiteView {
                site: marker("A1", LayerGroup::Water).site,
                open: false,
                phase: ViewPhase::Unavailable,
            },
        );
        state.poll_loads();
        assert!(state.views.is_empty());
    }
}
