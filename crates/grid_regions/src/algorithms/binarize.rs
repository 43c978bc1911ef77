use image::{GrayImage, RgbImage};
use crate::traits::Binarizer;

/// Grayscale conversion followed by an inverted Otsu threshold.
///
/// Ink (dark pixels) becomes foreground (255) on a black background.
#[derive(Debug, Clone, Default)]
pub struct OtsuBinarizer;

impl Binarizer for OtsuBinarizer {
    fn binarize(&self, image: &RgbImage) -> GrayImage {
        let gray = image::imageops::grayscale(image);
        binarize_gray(&gray)
    }
}

/// Inverted Otsu threshold of an already grayscale image.
pub fn binarize_gray(gray: &GrayImage) -> GrayImage {
    if is_uniform(gray) {
        // No bimodal histogram to split: nothing on the page is ink.
        return GrayImage::new(gray.width(), gray.height());
    }

    let level = imageproc::contrast::otsu_level(gray);
    let mut mask = imageproc::contrast::threshold(gray, level);
    image::imageops::invert(&mut mask);
    mask
}

fn is_uniform(gray: &GrayImage) -> bool {
    let mut pixels = gray.pixels();
    match pixels.next() {
        Some(first) => pixels.all(|p| p.0[0] == first.0[0]),
        None => true,
    }
}
