use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use crate::{error::Result, types::BoundingBox};

/// Crops candidate boxes out of the colour page, extended upward so that
/// captions and titles above a table come along with it.
#[derive(Debug, Clone)]
pub struct RegionCropper {
    pub pad_factor: f32,
}

impl Default for RegionCropper {
    fn default() -> Self {
        Self { pad_factor: 0.35 }
    }
}

impl RegionCropper {
    pub fn pad_top(&self, bbox: &BoundingBox) -> u32 {
        (self.pad_factor * bbox.height as f32).floor() as u32
    }

    /// The area to crop: `[max(0, y - pad_top), y + h) x [x, x + w)`.
    pub fn crop_area(&self, bbox: &BoundingBox) -> BoundingBox {
        let y0 = bbox.y.saturating_sub(self.pad_top(bbox));
        BoundingBox::new(bbox.x, y0, bbox.width, bbox.bottom() - y0)
    }

    /// Crop `bbox` out of `page` and encode it as PNG.
    pub fn crop(&self, page: &RgbImage, bbox: &BoundingBox) -> Result<(BoundingBox, Vec<u8>)> {
        let area = self.crop_area(bbox);
        let cropped = image::imageops::crop_imm(page, area.x, area.y, area.width, area.height).to_image();

        let mut encoded = Vec::new();
        cropped.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;
        Ok((area, encoded))
    }
}
