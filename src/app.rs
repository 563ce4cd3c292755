use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{map, panels, site_view};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TempMapApp {
    pub state: AppState,
}

impl TempMapApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for TempMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished background loads before anything draws.
        self.state.poll_loads();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: layer toggles ----
        egui::SidePanel::left("layer_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: site map ----
        let clicked = egui::CentralPanel::default()
            .show(ctx, |ui| map::site_map(ui, &self.state))
            .inner;
        if let Some(code) = clicked {
            self.state.open_site(&code);
        }

        // ---- Site windows ----
        site_view::site_windows(ctx, &mut self.state);

        // Keep polling while a load is in flight.
        if self.state.any_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
