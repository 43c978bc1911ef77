use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::error::{DetectError, Result};

/// Whether geometric grid validation gates acceptance.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strictness {
    /// Size filter only; rejection is left to a downstream classifier
    #[default]
    Permissive,
    /// Size filter plus a minimum number of line crossings inside the box
    Strict,
}

/// How candidate sequence indices are numbered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SequenceScope {
    /// One running count across the document, in page order
    #[default]
    Document,
    /// Numbering restarts at 0 on every page
    Page,
}

/// Detector configuration. Every field has a default, so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    pub strictness: Strictness,
    /// Minimum candidate width in pixels
    #[schemars(range(min = 1))]
    pub min_width: u32,
    /// Minimum candidate height in pixels
    #[schemars(range(min = 1))]
    pub min_height: u32,
    /// Minimum joint count in strict mode, ignored otherwise
    pub min_joints: u32,
    /// Length of the line structuring element. Must exceed glyph stroke length
    /// and stay below the smallest expected cell dimension.
    #[schemars(range(min = 1))]
    pub line_kernel_length: u32,
    /// Erosion/dilation iterations of the line opening
    #[schemars(range(min = 1))]
    pub line_open_iterations: u32,
    /// 3x3 dilation iterations used to bridge line crossings
    pub bridge_iterations: u8,
    /// Fraction of the box height added above it to capture captions
    #[schemars(range(min = 0.0))]
    pub pad_factor: f32,
    pub sequence_scope: SequenceScope,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::permissive()
    }
}

impl DetectorConfig {
    /// Over-accepting candidate generator, meant to be paired with a classifier.
    pub fn permissive() -> Self {
        Self {
            strictness: Strictness::Permissive,
            min_width: 100,
            min_height: 100,
            min_joints: 10,
            line_kernel_length: 40,
            line_open_iterations: 2,
            bridge_iterations: 3,
            pad_factor: 0.35,
            sequence_scope: SequenceScope::Document,
        }
    }

    /// Joint-count gated detector.
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            min_width: 150,
            ..Self::permissive()
        }
    }

    pub fn for_strictness(strictness: Strictness) -> Self {
        match strictness {
            Strictness::Permissive => Self::permissive(),
            Strictness::Strict => Self::strict(),
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_min_joints(mut self, min_joints: u32) -> Self {
        self.min_joints = min_joints;
        self
    }

    pub fn with_min_size(mut self, min_width: u32, min_height: u32) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn with_sequence_scope(mut self, scope: SequenceScope) -> Self {
        self.sequence_scope = scope;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_width == 0 || self.min_height == 0 {
            return Err(DetectError::InvalidConfig(
                "min_width and min_height must be at least 1".to_string(),
            ));
        }
        if self.line_kernel_length == 0 {
            return Err(DetectError::InvalidConfig(
                "line_kernel_length must be at least 1".to_string(),
            ));
        }
        if self.line_open_iterations == 0 {
            return Err(DetectError::InvalidConfig(
                "line_open_iterations must be at least 1".to_string(),
            ));
        }
        if !self.pad_factor.is_finite() || self.pad_factor < 0.0 {
            return Err(DetectError::InvalidConfig(format!(
                "pad_factor must be a finite non-negative number, got {}",
                self.pad_factor
            )));
        }
        Ok(())
    }

    /// JSON schema of the configuration surface
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectorConfig)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: DetectorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: DetectorConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format by extension and load
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            _ => Err(DetectError::UnsupportedConfigFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
