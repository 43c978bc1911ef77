pub mod builder;

use tracing::{debug, trace};
use crate::{
    algorithms::{joint_mask, GridIntersectionValidator, GridMaskCombiner, RegionCropper, SizeFilter},
    config::DetectorConfig,
    error::Result,
    traits::{ArtifactSink, Binarizer, LineExtractor, RegionExtractor},
    types::{artifact_file_name, BoundingBox, CandidateRegion, CroppedArtifact, PageImage},
};

/// A candidate cropped and encoded in memory, not yet persisted.
#[derive(Debug)]
pub struct RenderedCandidate {
    pub region: CandidateRegion,
    pub crop: BoundingBox,
    pub encoded: Result<Vec<u8>>,
}

/// Single-pass table region detector.
///
/// Configured once with a strictness policy and thresholds; otherwise a pure
/// function from a page to its candidates.
pub struct Detector {
    config: DetectorConfig,
    binarizer: Box<dyn Binarizer>,
    line_extractor: Box<dyn LineExtractor>,
    combiner: GridMaskCombiner,
    region_extractor: Box<dyn RegionExtractor>,
    size_filter: SizeFilter,
    validator: Option<GridIntersectionValidator>,
    cropper: RegionCropper,
}

impl Detector {
    /// Create a new detector builder
    pub fn builder() -> builder::DetectorBuilder {
        builder::DetectorBuilder::new()
    }

    /// Detector with the default stages for `config`
    pub fn new(config: DetectorConfig) -> Result<Self> {
        builder::DetectorBuilder::new().config(config).build()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Find candidate regions on a page.
    ///
    /// Sequence indices are page-local, counting from 0 in contour discovery
    /// order. Regions are not sorted by position.
    pub fn detect(&self, page: &PageImage) -> Vec<CandidateRegion> {
        // Step 1: Binary ink mask
        let mask = self.binarizer.binarize(&page.pixels);

        // Step 2: Horizontal and vertical ruling lines
        let lines = self.line_extractor.extract_lines(&mask);

        // Step 3: Bridge crossings into one blob per bordered region
        let grid = self.combiner.combine(&lines);

        // Step 4: External contours to boxes
        let boxes = self.region_extractor.extract_regions(&grid);

        // Step 5: Crossing mask, computed once per page and only when it gates acceptance
        let joints = self.validator.as_ref().map(|_| joint_mask(&lines));

        let mut regions = Vec::new();
        for bbox in boxes {
            if !self.size_filter.accepts(&bbox) {
                trace!(page = page.page_index, ?bbox, "below minimum size");
                continue;
            }

            let joint_count = match (&self.validator, &joints) {
                (Some(validator), Some(joints)) => match validator.validate(joints, &bbox) {
                    Some(count) => Some(count),
                    None => {
                        trace!(page = page.page_index, ?bbox, "too few line crossings");
                        continue;
                    }
                },
                _ => None,
            };

            regions.push(CandidateRegion {
                page_index: page.page_index,
                sequence_index: regions.len(),
                bbox,
                joint_count,
            });
        }

        debug!(
            page = page.page_index,
            candidates = regions.len(),
            strictness = %self.config.strictness,
            "detection finished"
        );
        regions
    }

    /// Crop and encode each region out of its page.
    pub fn render(&self, page: &PageImage, regions: Vec<CandidateRegion>) -> Vec<RenderedCandidate> {
        regions
            .into_iter()
            .map(|region| {
                let crop = self.cropper.crop_area(&region.bbox);
                let encoded = self
                    .cropper
                    .crop(&page.pixels, &region.bbox)
                    .map(|(_, encoded)| encoded);
                RenderedCandidate {
                    region,
                    crop,
                    encoded,
                }
            })
            .collect()
    }

    /// Detect, crop and persist one page with page-local sequence indices.
    ///
    /// Each entry is the artifact or the error that stopped that one candidate.
    pub fn process_page(&self, page: &PageImage, sink: &dyn ArtifactSink) -> Vec<Result<CroppedArtifact>> {
        let regions = self.detect(page);
        self.render(page, regions)
            .into_iter()
            .map(|rendered| persist(rendered, sink))
            .collect()
    }

    /// Get information about the detector configuration
    pub fn info(&self) -> String {
        format!(
            "Detector: {} policy, min size {}x{}, line kernel {} x{}, pad {:.2}{}",
            self.config.strictness,
            self.config.min_width,
            self.config.min_height,
            self.config.line_kernel_length,
            self.config.line_open_iterations,
            self.config.pad_factor,
            self.validator
                .as_ref()
                .map(|v| format!(", min joints {}", v.min_joints))
                .unwrap_or_default(),
        )
    }
}

/// Write a rendered candidate through `sink`.
pub(crate) fn persist(rendered: RenderedCandidate, sink: &dyn ArtifactSink) -> Result<CroppedArtifact> {
    let encoded = rendered.encoded?;
    let file_name = artifact_file_name(rendered.region.page_index, rendered.region.sequence_index);
    let path = sink.persist(&file_name, &encoded)?;
    Ok(CroppedArtifact {
        region: rendered.region,
        crop: rendered.crop,
        encoded,
        path,
    })
}
