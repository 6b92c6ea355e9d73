use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Single-series charts (histogram bars, scatter points).
pub const PRIMARY: Color32 = Color32::from_rgb(76, 120, 168);

// ---------------------------------------------------------------------------
// Category colours: cell value → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a boxplot's x column to distinct colours.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<Value, Color32>,
}

impl CategoryColors {
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a Value>) -> Self {
        let values: BTreeSet<&Value> = categories.into_iter().collect();
        let palette = generate_palette(values.len());
        let mapping = values
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();
        CategoryColors { mapping }
    }

    /// Look up the colour for a category; unknown values are grey.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}
