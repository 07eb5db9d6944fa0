use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Category colours: label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of one categorical column (seasons, weekdays, periods)
/// to distinct colours.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Build a colour map from the labels in display order.
    pub fn new(labels: &[String]) -> Self {
        let mapping = labels
            .iter()
            .cloned()
            .zip(generate_palette(labels.len()))
            .collect();

        CategoryColors {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation heatmap
// ---------------------------------------------------------------------------

/// Blue (−1) through light grey (0) to red (+1), interpolated in linear RGB.
/// Non-finite values are drawn dark grey.
pub fn diverging_color(value: f64) -> Color32 {
    if !value.is_finite() {
        return Color32::DARK_GRAY;
    }
    let v = value.clamp(-1.0, 1.0) as f32;
    let cold: LinSrgb = Srgb::new(0.230f32, 0.299, 0.754).into_linear();
    let neutral: LinSrgb = Srgb::new(0.865f32, 0.865, 0.865).into_linear();
    let warm: LinSrgb = Srgb::new(0.706f32, 0.016, 0.150).into_linear();

    let mixed = if v < 0.0 {
        cold.mix(neutral, v + 1.0)
    } else {
        neutral.mix(warm, v)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Label colour that stays readable on top of [`diverging_color`].
pub fn label_color_on(value: f64) -> Color32 {
    if value.is_finite() && value.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
