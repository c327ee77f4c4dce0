//! Candidate-region proposal: 8-connected foreground components of a
//! binarized frame, reduced to bounding rectangles and filtered by size,
//! exclusion mask, and color purity.

use arena_data::{PurityConfig, Rect, SizeBounds};
use image::{GrayImage, Rgba, RgbaImage};
use tracing::debug;

use crate::geometry::{Point, Polygon};

/// The non-binarized frame plus thresholds for the color-purity filter.
#[derive(Clone, Copy)]
pub struct ColorSource<'a> {
    pub frame: &'a RgbaImage,
    pub purity: &'a PurityConfig,
}

/// Propose candidate digit regions from a binarized frame.
///
/// Each foreground component becomes its bounding rectangle and is kept
/// only if it passes the size window, has no corner strictly inside a
/// mask polygon, and (when a color source is given) survives the
/// colored-pixel purity check.
pub fn segment(
    binary: &GrayImage,
    bounds: &SizeBounds,
    mask: &[Polygon],
    color: Option<ColorSource<'_>>,
) -> Vec<Rect> {
    let mut regions = Vec::new();
    for rect in connected_components(binary) {
        if corner_masked(&rect, mask) {
            debug!("region at ({}, {}) rejected by exclusion mask", rect.x, rect.y);
            continue;
        }
        if !size_accepted(&rect, bounds, binary.dimensions()) {
            continue;
        }
        if let Some(source) = color {
            if !is_black_white(source.frame, &rect, source.purity) {
                debug!("region at ({}, {}) rejected as colored", rect.x, rect.y);
                continue;
            }
        }
        regions.push(rect);
    }
    regions
}

/// Bounding rectangles of the 8-connected foreground components, in
/// row-major discovery order.
fn connected_components(binary: &GrayImage) -> Vec<Rect> {
    let (w, h) = binary.dimensions();
    let mut visited = vec![false; (w as usize) * (h as usize)];
    let idx = |x: u32, y: u32| (y as usize) * (w as usize) + x as usize;
    let mut rects = Vec::new();
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if binary.get_pixel(x, y)[0] == 0 || visited[idx(x, y)] {
                continue;
            }
            let (mut min_x, mut max_x, mut min_y, mut max_y) = (x, x, y, y);
            visited[idx(x, y)] = true;
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let (nx, ny) = (cx as i32 + dx, cy as i32 + dy);
                        if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                            continue;
                        }
                        let (nx, ny) = (nx as u32, ny as u32);
                        if binary.get_pixel(nx, ny)[0] > 0 && !visited[idx(nx, ny)] {
                            visited[idx(nx, ny)] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
            rects.push(Rect::new(
                min_x as i32,
                min_y as i32,
                max_x - min_x + 1,
                max_y - min_y + 1,
            ));
        }
    }
    rects
}

fn size_accepted(rect: &Rect, bounds: &SizeBounds, crop: (u32, u32)) -> bool {
    match *bounds {
        SizeBounds::Relative {
            h_min_div,
            h_max_div,
            w_min_div,
            w_max_div,
        } => {
            let (crop_w, crop_h) = (crop.0 as f64, crop.1 as f64);
            let (w, h) = (rect.w as f64, rect.h as f64);
            h >= crop_h / h_min_div
                && h <= crop_h / h_max_div
                && w >= crop_w / w_min_div
                && w <= crop_w / w_max_div
        }
        SizeBounds::Explicit {
            h_min,
            h_max,
            w_min,
            w_max,
        } => rect.h >= h_min && rect.h <= h_max && rect.w >= w_min && rect.w <= w_max,
    }
}

/// True when any of the rectangle's four corners lies strictly inside a
/// mask polygon. Masks cover icon chrome whose strokes resemble digits.
fn corner_masked(rect: &Rect, mask: &[Polygon]) -> bool {
    let corners = [
        Point::new(rect.x, rect.y),
        Point::new(rect.x + rect.w as i32, rect.y),
        Point::new(rect.x, rect.y + rect.h as i32),
        Point::new(rect.x + rect.w as i32, rect.y + rect.h as i32),
    ];
    mask.iter()
        .any(|poly| corners.iter().any(|&c| poly.contains_strict(c)))
}

/// True when the region under `rect` is effectively monochrome: fewer
/// than `max(count_floor, width_factor * w)` pixels exceed both the
/// saturation and value thresholds. Colored glyphs that survive
/// binarization are not digits.
fn is_black_white(frame: &RgbaImage, rect: &Rect, purity: &PurityConfig) -> bool {
    let (fw, fh) = frame.dimensions();
    let mut colored = 0u32;
    for y in rect.y..rect.y + rect.h as i32 {
        for x in rect.x..rect.x + rect.w as i32 {
            if x < 0 || y < 0 || x as u32 >= fw || y as u32 >= fh {
                continue;
            }
            let (s, v) = saturation_value(frame.get_pixel(x as u32, y as u32));
            if s > purity.min_saturation && v > purity.min_value {
                colored += 1;
            }
        }
    }
    colored < purity.count_floor.max(purity.width_factor * rect.w)
}

/// HSV saturation and value of an RGB pixel, on the 0-255 scale.
fn saturation_value(px: &Rgba<u8>) -> (u8, u8) {
    let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let s = if max == 0 { 0 } else { (max - min) * 255 / max };
    (s as u8, max as u8)
}
