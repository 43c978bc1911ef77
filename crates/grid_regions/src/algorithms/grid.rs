use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use crate::types::LineMasks;

/// Merges the two line masks into blobs covering whole bordered regions.
#[derive(Debug, Clone)]
pub struct GridMaskCombiner {
    /// Number of 3x3 dilations applied to the union
    pub bridge_iterations: u8,
}

impl Default for GridMaskCombiner {
    fn default() -> Self {
        Self { bridge_iterations: 3 }
    }
}

impl GridMaskCombiner {
    pub fn combine(&self, lines: &LineMasks) -> GrayImage {
        let union = pixelwise(&lines.horizontal, &lines.vertical, |h, v| h || v);
        if self.bridge_iterations == 0 {
            return union;
        }
        // k dilations by a 3x3 square equal one dilation by the L-inf ball of radius k.
        morphology::dilate(&union, Norm::LInf, self.bridge_iterations)
    }
}

/// Pixels set in both line masks: the crossings of horizontal and vertical lines.
pub fn joint_mask(lines: &LineMasks) -> GrayImage {
    pixelwise(&lines.horizontal, &lines.vertical, |h, v| h && v)
}

fn pixelwise(a: &GrayImage, b: &GrayImage, op: impl Fn(bool, bool) -> bool) -> GrayImage {
    let mut out = GrayImage::new(a.width(), a.height());
    for ((dst, pa), pb) in out.pixels_mut().zip(a.pixels()).zip(b.pixels()) {
        if op(pa.0[0] > 0, pb.0[0] > 0) {
            dst.0[0] = 255;
        }
    }
    out
}
