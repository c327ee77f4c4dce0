//! Fixed-coordinate number reading for ability/currency icons.

use arena_data::IconClassConfig;
use image::RgbaImage;
use std::collections::BTreeMap;
use tracing::debug;

use crate::binary;
use crate::matcher::DigitMatcher;
use crate::segment;

/// Read a multi-digit number from a fixed-coordinate icon crop.
///
/// The crop is binarized and segmented with the class bounds, each region
/// is classified, and the accepted digits are composed left to right
/// (ascending x, leftmost digit most significant). Returns 0 when no
/// region classifies: the icon shows no readout.
pub fn read_fixed_number(crop: &RgbaImage, matcher: &DigitMatcher, class: &IconClassConfig) -> u32 {
    let bw = binary::binarize(crop, class.binarize);
    let regions = segment::segment(&bw, &class.bounds, &[], None);

    let mut digits_by_x: BTreeMap<i32, u8> = BTreeMap::new();
    for rect in regions {
        let roi = image::imageops::crop_imm(&bw, rect.x as u32, rect.y as u32, rect.w, rect.h)
            .to_image();
        if let Some(digit) = matcher.classify(&roi) {
            digits_by_x.entry(rect.x).or_insert(digit);
        }
    }

    let value = digits_by_x
        .values()
        .fold(0u32, |acc, &digit| acc * 10 + digit as u32);
    if value != 0 {
        debug!("fixed-position readout: {}", value);
    }
    value
}
