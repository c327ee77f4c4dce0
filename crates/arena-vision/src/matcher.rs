//! Template-based digit classification: a binarized region is resampled
//! onto each reference bitmap and scored by pixel disagreement.

use anyhow::{ensure, Result};
use image::GrayImage;

/// Classifies one binarized region against the ten reference digit
/// bitmaps of an icon class.
pub struct DigitMatcher {
    templates: Vec<GrayImage>,
    error_threshold: f64,
}

impl DigitMatcher {
    /// `templates` must hold exactly ten bitmaps, indexed by digit.
    pub fn new(templates: Vec<GrayImage>, error_threshold: f64) -> Result<Self> {
        ensure!(
            templates.len() == 10,
            "digit matcher needs exactly 10 templates, got {}",
            templates.len()
        );
        Ok(Self {
            templates,
            error_threshold,
        })
    }

    /// Classify a binarized region. Returns the best-matching digit, or
    /// `None` when no template scores strictly below the error threshold.
    ///
    /// Deterministic: templates are scanned in digit order and only a
    /// strictly smaller score takes over, so ties resolve to the lowest
    /// digit.
    pub fn classify(&self, region: &GrayImage) -> Option<u8> {
        self.classify_observed(region, |_, _| {})
    }

    /// Like [`DigitMatcher::classify`], but reports every compared
    /// `(digit, score)` pair to `observer`. Lets a debug or visualization
    /// layer watch the comparison without the matcher depending on
    /// rendering.
    pub fn classify_observed<F>(&self, region: &GrayImage, mut observer: F) -> Option<u8>
    where
        F: FnMut(u8, f64),
    {
        let (rw, rh) = region.dimensions();
        if rw == 0 || rh == 0 {
            return None;
        }
        let region_ratio = rh as f64 / rw as f64;

        let mut best = self.error_threshold;
        let mut detected = None;
        for (digit, template) in self.templates.iter().enumerate() {
            let (tw, th) = template.dimensions();
            if tw == 0 || th == 0 {
                continue;
            }
            // a region clearly mis-shaped for this template cannot be its digit
            let ratio = region_ratio / (th as f64 / tw as f64);
            if ratio > 1.2 || ratio < 0.8 {
                continue;
            }

            let resized =
                image::imageops::resize(region, tw, th, image::imageops::FilterType::Nearest);
            let score = disagreement(&resized, template);
            observer(digit as u8, score);
            if score < best {
                best = score;
                detected = Some(digit as u8);
            }
        }
        detected
    }
}

/// Fraction of pixels where exactly one of the two images is foreground.
/// Agreement in either direction is not an error.
fn disagreement(a: &GrayImage, b: &GrayImage) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let errors = a
        .pixels()
        .zip(b.pixels())
        .filter(|(pa, pb)| (pa[0] > 0) != (pb[0] > 0))
        .count();
    errors as f64 / (a.width() * a.height()) as f64
}
