use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Size acceptance window for segmented regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SizeBounds {
    /// Bounds derived from the crop dimensions: accept a region iff
    /// `crop_h / h_min_div <= h <= crop_h / h_max_div` and likewise for
    /// width. Tuned to the fixed cooldown icon geometry.
    Relative {
        h_min_div: f64,
        h_max_div: f64,
        w_min_div: f64,
        w_max_div: f64,
    },
    /// Absolute pixel bounds, inclusive on both ends.
    Explicit {
        h_min: u32,
        h_max: u32,
        w_min: u32,
        w_max: u32,
    },
}

/// Thresholds for the colored-glyph rejection filter.
///
/// Digit glyphs are white on dark; colored icon art that survives
/// binarization is filtered by counting high-saturation pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurityConfig {
    /// HSV saturation above which a pixel counts as colored (0-255 scale).
    pub min_saturation: u8,
    /// HSV value above which a pixel counts as colored (0-255 scale).
    pub min_value: u8,
    /// A region is rejected once its colored-pixel count reaches
    /// `max(count_floor, width_factor * region_width)`.
    pub count_floor: u32,
    pub width_factor: u32,
}

/// Extraction tunables for one icon class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IconClassConfig {
    /// Binarization threshold: pixels strictly brighter become foreground.
    pub binarize: u8,
    /// A digit match is accepted only strictly below this disagreement
    /// score.
    pub error_threshold: f64,
    pub bounds: SizeBounds,
}

/// All tunables of the analyzer. Defaults carry the values tuned against
/// the reference capture set; `analyzer.json` in the data directory
/// overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Cooldown readouts on spell/skill icons.
    pub cooldown: IconClassConfig,
    /// The currency counter.
    pub money: IconClassConfig,
    /// Unit-level readouts on flexible-position icons.
    pub level: IconClassConfig,
    pub purity: PurityConfig,
    /// A unit reading matches a tracked unit strictly closer than this
    /// (pixels).
    pub match_distance: f64,
    /// A matched unit unseen for longer than this (ms) is not resurrected.
    pub stale_window_ms: i64,
    /// Eviction sweep: inactivity window (ms) and appearance floor.
    pub evict_inactive_ms: i64,
    pub evict_min_appearances: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cooldown: IconClassConfig {
                binarize: 150,
                error_threshold: 0.3,
                bounds: SizeBounds::Relative {
                    h_min_div: 1.6,
                    h_max_div: 1.3,
                    w_min_div: 9.3,
                    w_max_div: 4.1,
                },
            },
            money: IconClassConfig {
                binarize: 210,
                error_threshold: 0.99,
                bounds: SizeBounds::Explicit {
                    h_min: 10,
                    h_max: 16,
                    w_min: 3,
                    w_max: 11,
                },
            },
            level: IconClassConfig {
                binarize: 180,
                error_threshold: 0.3,
                bounds: SizeBounds::Explicit {
                    h_min: 12,
                    h_max: 15,
                    w_min: 4,
                    w_max: 10,
                },
            },
            purity: PurityConfig {
                min_saturation: 70,
                min_value: 30,
                count_floor: 12,
                width_factor: 2,
            },
            match_distance: 20.0,
            stale_window_ms: 3000,
            evict_inactive_ms: 1000,
            evict_min_appearances: 5,
        }
    }
}

impl AnalyzerConfig {
    /// Load `analyzer.json` from the data directory. A missing file falls
    /// back to the built-in defaults; a malformed one is an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("analyzer.json");
        if !path.exists() {
            warn!(
                "No analyzer.json found at {}. Using built-in defaults.",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config =
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AnalyzerConfig::load(Path::new("/nonexistent")).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_defaults_round_trip_through_json() {
        let config = AnalyzerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalyzerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_default_constants() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.level.binarize, 180);
        assert_eq!(config.match_distance, 20.0);
        assert_eq!(config.stale_window_ms, 3000);
        assert_eq!(
            config.money.bounds,
            SizeBounds::Explicit {
                h_min: 10,
                h_max: 16,
                w_min: 3,
                w_max: 11
            }
        );
    }
}
