use chrono::DateTime;
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use crate::color;
use crate::state::{AppState, SeriesView, ViewPhase};

// ---------------------------------------------------------------------------
// Site windows – chart and year selector
// ---------------------------------------------------------------------------

/// Render one window per open site. Each window owns its own chart and
/// year selection, so several sites can be open at once without
/// interfering.
pub fn site_windows(ctx: &egui::Context, state: &mut AppState) {
    for view in state.views.values_mut() {
        let mut open = view.open;
        egui::Window::new(format!("{} ({})", view.site.name, view.site.code))
            .id(egui::Id::new(("site_window", view.site.code.clone())))
            .default_width(440.0)
            .default_height(320.0)
            .open(&mut open)
            .show(ctx, |ui: &mut Ui| match &mut view.phase {
                ViewPhase::Loading(_) => {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.spinner();
                        ui.label("Loading time series…");
                    });
                }
                ViewPhase::Unavailable => {
                    ui.label("No data available for this site.");
                }
                ViewPhase::Failed(message) => {
                    ui.label(
                        RichText::new(format!("Could not load site data: {message}"))
                            .color(Color32::RED),
                    );
                }
                ViewPhase::Ready(series_view) => {
                    series_panel(ui, &view.site.code, series_view);
                }
            });
        view.open = open;
    }
}

fn series_panel(ui: &mut Ui, code: &str, view: &mut SeriesView) {
    let Some(selected) = view.selected_year else {
        ui.label("The data file contains no observations.");
        return;
    };

    // Clone the year list so we can mutate the view inside the loop.
    let years = view.series.years.clone();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Year:");
        egui::ComboBox::from_id_salt(("year_select", code))
            .selected_text(selected.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for &year in &years {
                    if ui
                        .selectable_label(selected == year, year.to_string())
                        .clicked()
                    {
                        view.select_year(year);
                    }
                }
            });
        ui.label(format!("{} observations", view.points.len()));
    });

    temperature_chart(ui, code, &view.points);
}

/// Draw the temperature line for the selected year. Immediate mode
/// redraws the whole chart each frame, so a year change fully replaces
/// the previous chart; the value axis auto-fits (no forced zero
/// baseline).
fn temperature_chart(ui: &mut Ui, code: &str, points: &[[f64; 2]]) {
    let plot_points: PlotPoints = points.iter().copied().collect();

    Plot::new(("site_chart", code.to_string()))
        .y_axis_label("Temperature (°C)")
        .x_axis_formatter(|mark, _range| format_date(mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(plot_points).color(color::CHART_LINE).width(1.5));
        });
}

fn format_date(unix_seconds: f64) -> String {
    DateTime::from_timestamp(unix_seconds as i64, 0)
        .map(|dt| dt.format("%b %d").to_string())
        .unwrap_or_default()
}
