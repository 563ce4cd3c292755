use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::LayerGroup;

// ---------------------------------------------------------------------------
// Marker and chart colors
// ---------------------------------------------------------------------------

/// Chart line color for the temperature series.
pub const CHART_LINE: Color32 = Color32::from_rgb(54, 162, 235);

/// Convert an HSL triple to an egui color.
fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Marker color for a layer group. Fixed hues: blue for water sites,
/// amber for air sites, red for sites without data.
pub fn layer_color(group: LayerGroup) -> Color32 {
    match group {
        LayerGroup::Water => hsl_color(205.0, 0.75, 0.55),
        LayerGroup::Air => hsl_color(40.0, 0.85, 0.50),
        LayerGroup::Unavailable => hsl_color(0.0, 0.70, 0.55),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_colors_are_distinct() {
        let colors: Vec<Color32> = LayerGroup::ALL.iter().map(|&g| layer_color(g)).collect();
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
    }
}
