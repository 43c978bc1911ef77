use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use crate::types::BoundingBox;

/// Rejects candidates with too few line crossings.
///
/// A real table has many internal crossings; a plain frame or photo border
/// only has its four corners.
#[derive(Debug, Clone)]
pub struct GridIntersectionValidator {
    pub min_joints: u32,
}

impl Default for GridIntersectionValidator {
    fn default() -> Self {
        Self { min_joints: 10 }
    }
}

impl GridIntersectionValidator {
    /// Counts crossings inside `bbox` and returns the count if it passes.
    pub fn validate(&self, joints: &GrayImage, bbox: &BoundingBox) -> Option<u32> {
        let count = count_joints(joints, bbox);
        (count >= self.min_joints).then_some(count)
    }
}

/// Number of 8-connected joint blobs inside `bbox`.
pub fn count_joints(joints: &GrayImage, bbox: &BoundingBox) -> u32 {
    let roi = image::imageops::crop_imm(joints, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
    if roi.width() == 0 || roi.height() == 0 {
        return 0;
    }
    // Labels are consecutive from 1, so the largest label is the component count.
    connected_components(&roi, Connectivity::Eight, Luma([0u8]))
        .pixels()
        .map(|p| p.0[0])
        .max()
        .unwrap_or(0)
}
