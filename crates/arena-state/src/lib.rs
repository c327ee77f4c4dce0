use serde::{Deserialize, Serialize};

mod tracker;
pub use tracker::{TrackedUnit, UnitTracker};

/// Pixel position in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One tracked unit as observed in a single frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub identity: u64,
    pub position: Point,
    pub level: u32,
}

/// Everything extracted from one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameStatus {
    /// Frame timestamp in milliseconds.
    pub ts: i64,
    /// Joystick direction in degrees, screen-up positive; `None` when no
    /// joystick circle was detected in this frame.
    pub joystick_angle: Option<f64>,
    /// Spell cooldowns in seconds; 0 means no cooldown readout was visible.
    pub spell_cds: [u32; 3],
    /// Skill cooldowns in seconds; 0 means no cooldown readout was visible.
    pub skill_cds: [u32; 4],
    pub money: u32,
    pub units: Vec<UnitSnapshot>,
}

/// Append-only log of per-frame status records, in processing order.
#[derive(Debug, Default)]
pub struct StatusLog {
    frames: Vec<FrameStatus>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, status: FrameStatus) {
        self.frames.push(status);
    }

    pub fn frames(&self) -> &[FrameStatus] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_status_log_preserves_order() {
        let mut log = StatusLog::new();
        for ts in [0i64, 500, 1000] {
            log.push(FrameStatus {
                ts,
                joystick_angle: None,
                spell_cds: [0; 3],
                skill_cds: [0; 4],
                money: 0,
                units: Vec::new(),
            });
        }
        assert_eq!(log.len(), 3);
        let stamps: Vec<i64> = log.frames().iter().map(|f| f.ts).collect();
        assert_eq!(stamps, vec![0, 500, 1000]);
    }

    #[test]
    fn test_frame_status_serializes_missing_joystick_as_null() {
        let status = FrameStatus {
            ts: 42,
            joystick_angle: None,
            spell_cds: [1, 2, 3],
            skill_cds: [4, 5, 6, 7],
            money: 128,
            units: vec![UnitSnapshot {
                identity: 0,
                position: Point::new(10, 20),
                level: 5,
            }],
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json["joystick_angle"].is_null());
        assert_eq!(json["money"], 128);
        assert_eq!(json["units"][0]["level"], 5);

        let back: FrameStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back.ts, 42);
        assert_eq!(back.units.len(), 1);
    }
}
