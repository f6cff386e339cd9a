use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Medal, Sex};

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed colours for the categorical columns
// ---------------------------------------------------------------------------

pub fn medal_color(medal: Medal) -> Color32 {
    match medal {
        Medal::Gold => Color32::from_rgb(212, 175, 55),
        Medal::Silver => Color32::from_rgb(160, 160, 170),
        Medal::Bronze => Color32::from_rgb(176, 112, 60),
    }
}

pub fn sex_color(sex: Option<Sex>) -> Color32 {
    match sex {
        Some(Sex::Male) => Color32::from_rgb(66, 133, 244),
        Some(Sex::Female) => Color32::from_rgb(234, 67, 53),
        None => Color32::GRAY,
    }
}

pub fn sex_label(sex: Option<Sex>) -> String {
    sex.map(|s| s.to_string()).unwrap_or_else(|| "Unknown".to_string())
}

// ---------------------------------------------------------------------------
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps series labels (e.g. selected countries) to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the labels; palette order follows sorted labels.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a String>) -> Self {
        let mut sorted: Vec<&String> = labels.into_iter().collect();
        sorted.sort();
        sorted.dedup();
        let palette = generate_palette(sorted.len());
        ColorMap {
            mapping: sorted.into_iter().cloned().zip(palette).collect(),
        }
    }

    /// Look up the colour for a label, gray when unknown.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl ColorMap {
        fn len(&self) -> usize {
            self.mapping.len()
        }
    }

    #[test]
    fn test_palette_size_and_distinct() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_color_map_is_order_independent() {
        let a = ["USA".to_string(), "JPN".to_string()];
        let b = ["JPN".to_string(), "USA".to_string(), "JPN".to_string()];
        let ma = ColorMap::new(&a);
        let mb = ColorMap::new(&b);
        assert_eq!(mb.len(), 2);
        assert_eq!(ma.color_for("JPN"), mb.color_for("JPN"));
        assert_eq!(ma.color_for("FRA"), Color32::GRAY);
    }
}
