use image::{GrayImage, RgbaImage};

/// Binarize with a fixed threshold: pixels strictly brighter than
/// `threshold` become foreground (255), everything else background (0).
pub fn binarize(image: &RgbaImage, threshold: u8) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    binarize_gray(&gray, threshold)
}

pub fn binarize_gray(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        if gray.get_pixel(x, y)[0] > threshold {
            image::Luma([255u8])
        } else {
            image::Luma([0u8])
        }
    })
}
