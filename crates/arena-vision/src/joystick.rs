//! Joystick direction estimation from a detected circle, plus the axis
//! calibration statistic accumulated over a run.

use arena_data::Rect;
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A detected circle, in the coordinates of the searched crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// Externally supplied circle-detection primitive.
pub trait CircleDetector {
    fn detect(&self, gray: &GrayImage) -> Vec<Circle>;
}

/// Computes the joystick direction from the first circle found in a
/// fixed search window, and accumulates the circle-to-axis distance of
/// every detection for an offline calibration check.
pub struct JoystickEstimator {
    search: Rect,
    axis: (i32, i32),
    distances: Vec<f64>,
}

impl JoystickEstimator {
    pub fn new(search: Rect, axis: (i32, i32)) -> Self {
        Self {
            search,
            axis,
            distances: Vec::new(),
        }
    }

    /// Estimate the joystick angle in degrees for one frame, with screen
    /// y inverted so "up" is positive. `None` when no circle is found.
    pub fn estimate(&mut self, frame: &RgbaImage, detector: &dyn CircleDetector) -> Option<f64> {
        let crop = image::imageops::crop_imm(
            frame,
            self.search.x as u32,
            self.search.y as u32,
            self.search.w,
            self.search.h,
        )
        .to_image();
        let gray = image::imageops::grayscale(&crop);

        let circles = detector.detect(&gray);
        let circle = circles.first()?;

        let cx = self.search.x as f64 + circle.cx;
        let cy = self.search.y as f64 + circle.cy;
        let dx = cx - self.axis.0 as f64;
        let dy = self.axis.1 as f64 - cy;
        self.distances.push((dx * dx + dy * dy).sqrt());

        let angle = dy.atan2(dx).to_degrees();
        debug!("joystick circle at ({:.1}, {:.1}), angle {:.1}", cx, cy, angle);
        Some(angle)
    }

    /// Mean and sample standard deviation (n-1 divisor) of the recorded
    /// circle-to-axis distances. `None` until two samples exist. Used
    /// offline to sanity-check the fixed axis calibration, never to gate
    /// per-frame output.
    pub fn axis_stats(&self) -> Option<(f64, f64)> {
        if self.distances.len() < 2 {
            return None;
        }
        let n = self.distances.len() as f64;
        let mean = self.distances.iter().sum::<f64>() / n;
        let variance = self
            .distances
            .iter()
            .map(|d| (d - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        Some((mean, variance.sqrt()))
    }

    pub fn sample_count(&self) -> usize {
        self.distances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Reports one fixed circle regardless of input.
    struct FixedCircle(Option<Circle>);

    impl CircleDetector for FixedCircle {
        fn detect(&self, _gray: &GrayImage) -> Vec<Circle> {
            self.0.into_iter().collect()
        }
    }

    fn estimator() -> JoystickEstimator {
        JoystickEstimator::new(Rect::new(58, 411, 294, 309), (206, 559))
    }

    fn frame() -> RgbaImage {
        RgbaImage::from_pixel(1280, 720, Rgba([0, 0, 0, 255]))
    }

    /// Detector placing the circle center at the given frame coordinates.
    fn at_frame(x: f64, y: f64) -> FixedCircle {
        FixedCircle(Some(Circle {
            cx: x - 58.0,
            cy: y - 411.0,
            radius: 45.0,
        }))
    }

    #[test]
    fn test_no_circle_is_undetected_and_records_nothing() {
        let mut e = estimator();
        assert_eq!(e.estimate(&frame(), &FixedCircle(None)), None);
        assert_eq!(e.sample_count(), 0);
    }

    #[test]
    fn test_angle_is_measured_with_screen_up_positive() {
        let mut e = estimator();
        let angle = e.estimate(&frame(), &at_frame(206.0, 509.0)).unwrap();
        assert!((angle - 90.0).abs() < 1e-9, "straight up should be 90, got {}", angle);

        let angle = e.estimate(&frame(), &at_frame(256.0, 559.0)).unwrap();
        assert!(angle.abs() < 1e-9, "straight right should be 0, got {}", angle);

        let angle = e.estimate(&frame(), &at_frame(206.0, 609.0)).unwrap();
        assert!((angle + 90.0).abs() < 1e-9, "straight down should be -90, got {}", angle);
    }

    #[test]
    fn test_axis_stats_need_two_samples() {
        let mut e = estimator();
        assert_eq!(e.axis_stats(), None);
        e.estimate(&frame(), &at_frame(209.0, 559.0));
        assert_eq!(e.axis_stats(), None);
        e.estimate(&frame(), &at_frame(210.0, 559.0));
        assert!(e.axis_stats().is_some());
    }

    #[test]
    fn test_axis_stats_sample_standard_deviation() {
        let mut e = estimator();
        for d in [3.0, 4.0, 5.0] {
            e.estimate(&frame(), &at_frame(206.0 + d, 559.0));
        }
        let (mean, std_dev) = e.axis_stats().unwrap();
        assert!((mean - 4.0).abs() < 1e-9);
        assert!((std_dev - 1.0).abs() < 1e-9);
    }
}
