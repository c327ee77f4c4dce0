//! Immutable startup assets for the telemetry analyzer: digit template
//! bitmaps, the unit-icon exclusion mask, extraction tunables, and the
//! fixed screen layout.

use anyhow::{Context, Result};
use image::GrayImage;
use std::path::Path;
use tracing::{info, warn};

pub mod config;
pub mod layout;

pub use config::{AnalyzerConfig, IconClassConfig, PurityConfig, SizeBounds};
pub use layout::Rect;

/// Reference digit bitmaps, one set of ten per icon class. The game
/// renders cooldown, money and level digits in different fonts, so each
/// class carries its own set. Loaded once at startup; immutable for the
/// run.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    pub cooldown: Vec<GrayImage>,
    pub money: Vec<GrayImage>,
    pub level: Vec<GrayImage>,
}

impl TemplateLibrary {
    /// Load the three digit template sets from
    /// `data_dir/templates/{cooldown,money,level}/{0..9}.png`.
    ///
    /// A missing or undecodable file is a startup error: the matcher
    /// cannot run against a partial set.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let templates_dir = data_dir.join("templates");
        let library = Self {
            cooldown: load_digit_set(&templates_dir, "cooldown")?,
            money: load_digit_set(&templates_dir, "money")?,
            level: load_digit_set(&templates_dir, "level")?,
        };
        info!("Loaded digit templates from {}", templates_dir.display());
        Ok(library)
    }
}

fn load_digit_set(templates_dir: &Path, class: &str) -> Result<Vec<GrayImage>> {
    let class_dir = templates_dir.join(class);
    let mut set = Vec::with_capacity(10);
    for digit in 0..10 {
        let path = class_dir.join(format!("{}.png", digit));
        let img = image::open(&path)
            .with_context(|| format!("Failed to open digit template {}", path.display()))?;
        set.push(img.to_luma8());
    }
    Ok(set)
}

/// Load the unit-icon exclusion mask bitmap. The mask is optional:
/// without it every candidate region survives the mask filter.
pub fn load_mask_bitmap(data_dir: &Path) -> Option<GrayImage> {
    let path = data_dir.join("mask.png");
    if !path.exists() {
        warn!(
            "No mask.png found at {}. Unit-icon masking disabled.",
            path.display()
        );
        return None;
    }
    match image::open(&path) {
        Ok(img) => Some(img.to_luma8()),
        Err(e) => {
            warn!(
                "Failed to decode {}: {}. Unit-icon masking disabled.",
                path.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_set_is_an_error() {
        let err = TemplateLibrary::load(Path::new("/nonexistent")).unwrap_err();
        assert!(format!("{:#}", err).contains("digit template"));
    }

    #[test]
    fn test_missing_mask_degrades_to_none() {
        assert!(load_mask_bitmap(Path::new("/nonexistent")).is_none());
    }
}
