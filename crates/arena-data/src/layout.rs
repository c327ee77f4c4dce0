//! Fixed screen geometry at the 1280x720 reference resolution.
//!
//! Frames are normalized to this resolution before extraction, so every
//! coordinate below is absolute.

use serde::{Deserialize, Serialize};

pub const FRAME_WIDTH: u32 = 1280;
pub const FRAME_HEIGHT: u32 = 720;

/// Axis-aligned pixel rectangle within a normalized frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

const SPELL_RADIUS: f64 = 52.0;
const SKILL_RADIUS: f64 = 40.0;

/// Currency counter box, left side of the HUD.
pub fn money() -> Rect {
    Rect::new(18, 340, 64, 22)
}

/// Crop covering the cooldown readout of a circular icon of radius `r`
/// centered at `(cx, cy)`: a 1.6r x 0.8r box across the icon's middle.
pub fn icon_crop(cx: i32, cy: i32, radius: f64) -> Rect {
    Rect::new(
        (cx as f64 - radius * 0.8) as i32,
        (cy as f64 - radius * 0.4) as i32,
        (radius * 1.6) as u32,
        (radius * 0.8) as u32,
    )
}

/// Spell icon cooldown readouts, stacked along the right edge.
pub fn spell_slots() -> [Rect; 3] {
    [
        icon_crop(1161, 420, SPELL_RADIUS),
        icon_crop(1028, 497, SPELL_RADIUS),
        icon_crop(949, 630, SPELL_RADIUS),
    ]
}

/// Skill icon cooldown readouts: three along the bottom, one upper-right.
pub fn skill_slots() -> [Rect; 4] {
    [
        icon_crop(643, 644, SKILL_RADIUS),
        icon_crop(738, 644, SKILL_RADIUS),
        icon_crop(837, 644, SKILL_RADIUS),
        icon_crop(1155, 279, SKILL_RADIUS),
    ]
}

/// Search window for the joystick circle, lower-left of the frame.
pub fn joystick_search() -> Rect {
    Rect::new(58, 411, 294, 309)
}

/// Resting center of the joystick; direction is measured from here.
pub fn joystick_axis() -> (i32, i32) {
    (206, 559)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_crop_truncates_like_the_reference() {
        // 1161 - 52 * 0.8 = 1119.4, truncated
        assert_eq!(icon_crop(1161, 420, 52.0), Rect::new(1119, 399, 83, 41));
        assert_eq!(icon_crop(643, 644, 40.0), Rect::new(611, 628, 64, 32));
    }

    #[test]
    fn test_fixed_regions_fit_the_reference_frame() {
        let mut rects = vec![money(), joystick_search()];
        rects.extend(spell_slots());
        rects.extend(skill_slots());
        for r in rects {
            assert!(r.x >= 0 && r.y >= 0);
            assert!(r.x as u32 + r.w <= FRAME_WIDTH, "{:?}", r);
            assert!(r.y as u32 + r.h <= FRAME_HEIGHT, "{:?}", r);
        }
    }
}
