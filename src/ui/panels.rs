use eframe::egui::{self, RichText, Ui};

use crate::color;
use crate::data::model::LayerGroup;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – layer toggles
// ---------------------------------------------------------------------------

/// Render the layer panel: one checkbox per togglable marker group.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Layers");
    ui.separator();

    if state.markers.is_none() {
        ui.label("No catalog loaded.");
        return;
    }

    for group in LayerGroup::ALL {
        let count = state.group_markers(group).count();
        let mut visible = state.layer_visible(group);
        let label = RichText::new(format!("{group}  ({count})")).color(color::layer_color(group));
        if ui.checkbox(&mut visible, label).changed() {
            state.toggle_layer(group);
        }
    }

    ui.separator();
    ui.label("Click a marker to open its temperature chart.");
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open catalog…").clicked() {
                open_catalog_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload_catalog();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(markers) = &state.markers {
            let shown = markers
                .iter()
                .filter(|m| state.layer_visible(m.group))
                .count();
            ui.label(format!("{} sites, {} shown", markers.len(), shown));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn open_catalog_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open site catalog")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        // Per-site files are resolved relative to the chosen catalog.
        if let Some(dir) = path.parent() {
            state.config.data_dir = dir.to_path_buf();
        }
        if let Some(name) = path.file_name() {
            state.config.catalog_file = name.to_string_lossy().into_owned();
        }
        state.reload_catalog();
    }
}
