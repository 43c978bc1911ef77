use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use crate::{traits::RegionExtractor, types::BoundingBox};

/// Imageproc-based extractor of external contour bounding boxes
#[derive(Debug, Clone, Default)]
pub struct ExternalContourExtractor;

impl RegionExtractor for ExternalContourExtractor {
    fn extract_regions(&self, grid: &GrayImage) -> Vec<BoundingBox> {
        find_contours::<i32>(grid)
            .into_iter()
            // Outer borders with no enclosing hole; nested blobs are ignored.
            .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
            .filter_map(|contour| {
                let mut points = contour.points.iter();
                let first = points.next()?;
                let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
                for p in points {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Some(BoundingBox::new(
                    min_x as u32,
                    min_y as u32,
                    (max_x - min_x + 1) as u32,
                    (max_y - min_y + 1) as u32,
                ))
            })
            .collect()
    }
}

/// Minimum-size gate shared by both strictness policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeFilter {
    pub min_width: u32,
    pub min_height: u32,
}

impl SizeFilter {
    pub fn accepts(&self, bbox: &BoundingBox) -> bool {
        bbox.width >= self.min_width && bbox.height >= self.min_height
    }
}
