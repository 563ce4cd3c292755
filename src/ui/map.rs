use eframe::egui::{Align2, Color32, RichText, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text};

use crate::color;
use crate::data::model::{LayerGroup, Marker};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Site map (central panel)
// ---------------------------------------------------------------------------

/// Fraction of the visible plot range within which a pointer hits a
/// marker.
const HIT_RADIUS_FRACTION: f64 = 0.02;

/// Render the marker map. Returns the code of a clicked marker, if any.
pub fn site_map(ui: &mut Ui, state: &AppState) -> Option<String> {
    if let Some(error) = &state.catalog_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new(format!("Failed to load the site catalog:\n{error}"))
                    .color(Color32::RED),
            );
        });
        return None;
    }
    if state.markers.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a site catalog to begin  (File → Open catalog…)");
        });
        return None;
    }

    let label_color = ui.visuals().strong_text_color();

    Plot::new("site_map")
        .data_aspect(1.0)
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.4}, {:.4}", value.y, value.x)
            } else {
                format!("{name}\n{:.4}, {:.4}", value.y, value.x)
            }
        })
        .show(ui, |plot_ui| {
            for group in LayerGroup::ALL {
                if !state.layer_visible(group) {
                    continue;
                }
                let points: PlotPoints = state
                    .group_markers(group)
                    .map(|m| [m.site.longitude, m.site.latitude])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(5.0)
                        .color(color::layer_color(group))
                        .name(group.to_string()),
                );
            }

            let bounds = plot_ui.plot_bounds();
            let hovered = plot_ui
                .pointer_coordinate()
                .and_then(|pointer| nearest_marker(state, pointer, bounds));

            if let Some(marker) = hovered {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(marker.site.longitude, marker.site.latitude),
                        RichText::new(format!("{} ({})", marker.site.name, marker.site.code))
                            .strong(),
                    )
                    .anchor(Align2::CENTER_BOTTOM)
                    .color(label_color),
                );
            }

            if plot_ui.response().clicked() {
                hovered.map(|m| m.site.code.clone())
            } else {
                None
            }
        })
        .inner
}

/// Closest visible marker within the hit radius, measured relative to the
/// current plot bounds so the hit area follows the zoom level.
fn nearest_marker(state: &AppState, pointer: PlotPoint, bounds: PlotBounds) -> Option<&Marker> {
    let width = bounds.width().max(f64::EPSILON);
    let height = bounds.height().max(f64::EPSILON);

    let mut best: Option<(&Marker, f64)> = None;
    for group in LayerGroup::ALL {
        if !state.layer_visible(group) {
            continue;
        }
        for marker in state.group_markers(group) {
            let dx = (marker.site.longitude - pointer.x) / width;
            let dy = (marker.site.latitude - pointer.y) / height;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= HIT_RADIUS_FRACTION
                && best.map_or(true, |(_, d)| distance < d)
            {
                best = Some((marker, distance));
            }
        }
    }
    best.map(|(marker, _)| marker)
}
