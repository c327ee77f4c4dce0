//! Stateless per-frame extraction: binarization, candidate-region
//! segmentation, template-based digit classification, multi-digit
//! composition, and joystick direction estimation.

pub mod binary;
pub mod compose;
pub mod geometry;
pub mod joystick;
pub mod matcher;
pub mod reader;
pub mod segment;

pub use compose::{compose, DigitReading, NumericReading};
pub use geometry::{trace_boundaries, Polygon};
pub use joystick::{Circle, CircleDetector, JoystickEstimator};
pub use matcher::DigitMatcher;
pub use reader::read_fixed_number;
pub use segment::{segment, ColorSource};
