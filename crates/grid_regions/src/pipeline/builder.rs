use crate::{
    pipeline::Detector,
    config::{DetectorConfig, Strictness},
    error::Result,
    traits::{Binarizer, LineExtractor, RegionExtractor},
    algorithms::{
        ExternalContourExtractor,
        GridIntersectionValidator,
        GridMaskCombiner,
        MorphologicalLineExtractor,
        OtsuBinarizer,
        RegionCropper,
        SizeFilter,
    },
};

/// Builder for creating detectors with a fluent API
pub struct DetectorBuilder {
    config: DetectorConfig,
    binarizer: Option<Box<dyn Binarizer>>,
    line_extractor: Option<Box<dyn LineExtractor>>,
    region_extractor: Option<Box<dyn RegionExtractor>>,
}

impl DetectorBuilder {
    /// Create a new builder with the permissive preset
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
            binarizer: None,
            line_extractor: None,
            region_extractor: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.config.strictness = strictness;
        self
    }

    pub fn min_joints(mut self, min_joints: u32) -> Self {
        self.config.min_joints = min_joints;
        self
    }

    pub fn min_size(mut self, min_width: u32, min_height: u32) -> Self {
        self.config.min_width = min_width;
        self.config.min_height = min_height;
        self
    }

    pub fn line_kernel_length(mut self, length: u32) -> Self {
        self.config.line_kernel_length = length;
        self
    }

    pub fn pad_factor(mut self, pad_factor: f32) -> Self {
        self.config.pad_factor = pad_factor;
        self
    }

    /// Set the binarizer (replaces the Otsu default)
    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: Binarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    /// Set the line extractor (replaces the morphological default, which
    /// would otherwise be built from the configured kernel)
    pub fn set_line_extractor<L>(mut self, extractor: L) -> Self
    where
        L: LineExtractor + 'static,
    {
        self.line_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the region extractor (replaces the external contour default)
    pub fn set_region_extractor<R>(mut self, extractor: R) -> Self
    where
        R: RegionExtractor + 'static,
    {
        self.region_extractor = Some(Box::new(extractor));
        self
    }

    /// Validate the configuration and build the detector, filling in
    /// default stages where none were set
    pub fn build(self) -> Result<Detector> {
        self.config.validate()?;
        let config = self.config;

        let binarizer = self.binarizer.unwrap_or_else(|| Box::new(OtsuBinarizer));

        let line_extractor = self.line_extractor.unwrap_or_else(|| {
            Box::new(MorphologicalLineExtractor {
                kernel_length: config.line_kernel_length,
                iterations: config.line_open_iterations,
            })
        });

        let region_extractor = self
            .region_extractor
            .unwrap_or_else(|| Box::new(ExternalContourExtractor));

        let validator = config.is_strict().then(|| GridIntersectionValidator {
            min_joints: config.min_joints,
        });

        Ok(Detector {
            binarizer,
            line_extractor,
            combiner: GridMaskCombiner {
                bridge_iterations: config.bridge_iterations,
            },
            region_extractor,
            size_filter: SizeFilter {
                min_width: config.min_width,
                min_height: config.min_height,
            },
            validator,
            cropper: RegionCropper {
                pad_factor: config.pad_factor,
            },
            config,
        })
    }

    /// Candidate generator that leaves rejection to a classifier
    pub fn build_permissive() -> Result<Detector> {
        Self::new().config(DetectorConfig::permissive()).build()
    }

    /// Joint-count gated detector
    pub fn build_strict(min_joints: u32) -> Result<Detector> {
        Self::new()
            .config(DetectorConfig::strict())
            .min_joints(min_joints)
            .build()
    }
}

impl Default for DetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
