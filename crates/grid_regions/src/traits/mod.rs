use std::path::PathBuf;

use image::{GrayImage, RgbImage};
use crate::{
    error::Result,
    types::{BoundingBox, CroppedArtifact, LineMasks, PageImage},
};

/// Trait for turning a colour page into a binary ink mask
pub trait Binarizer: Send + Sync {
    /// Foreground (255) where there is ink, background (0) elsewhere
    fn binarize(&self, image: &RgbImage) -> GrayImage;
}

/// Trait for isolating line-like structure along both axes
pub trait LineExtractor: Send + Sync {
    fn extract_lines(&self, mask: &GrayImage) -> LineMasks;
}

/// Trait for proposing boxes from a combined grid mask
pub trait RegionExtractor: Send + Sync {
    /// Bounding boxes in discovery order, before any size filtering
    fn extract_regions(&self, grid: &GrayImage) -> Vec<BoundingBox>;
}

/// Supplies rasterized pages, one at a time.
pub trait PageSource: Send + Sync {
    fn page_count(&self) -> usize;

    /// Load the page with the given 1-based index
    fn load_page(&self, page_index: usize) -> Result<PageImage>;
}

/// Persists encoded artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Write `encoded` under `file_name`, returning where it ended up
    fn persist(&self, file_name: &str, encoded: &[u8]) -> Result<PathBuf>;

    /// Remove a previously persisted artifact
    fn discard(&self, path: &std::path::Path) -> Result<()>;
}

/// Decides whether an artifact really is a table. Typically backed by a
/// vision model service.
pub trait CandidateClassifier: Send + Sync {
    fn is_table(&self, artifact: &CroppedArtifact) -> Result<bool>;
}
