//! Reconstructs structured game-state telemetry (ability cooldowns,
//! currency, joystick direction, per-unit identity and level) from a
//! sequence of screen-capture frames.
//!
//! The heavy lifting lives in the workspace crates: `arena-data` holds
//! the immutable startup assets and tunables, `arena-vision` the
//! stateless per-frame extraction, and `arena-state` the cross-frame
//! model. This crate wires them into a frame-sequential pipeline.

pub mod pipeline;

pub use pipeline::{FrameAnalyzer, Session};

pub use arena_data::{load_mask_bitmap, AnalyzerConfig, TemplateLibrary};
pub use arena_state::{FrameStatus, StatusLog, UnitSnapshot};
pub use arena_vision::{Circle, CircleDetector};
