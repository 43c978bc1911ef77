use grid_regions::{DetectError, DetectorConfig, ImageFileSource};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error("Missing 'pages' or 'pages_dir' field")]
    MissingPages,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// A document scan described in a job file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScanJob {
    /// Directory of rendered page images, read in file name order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_dir: Option<PathBuf>,
    /// Page images in page order; takes precedence over `pages_dir`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PathBuf>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub detector: DetectorConfig,
}

impl ScanJob {
    /// Load a ScanJob from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a ScanJob from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, JobError> {
        let job: ScanJob = toml::from_str(content)?;
        job.detector.validate()?;
        Ok(job)
    }

    /// Load a ScanJob from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a ScanJob from a JSON string
    pub fn from_json(content: &str) -> Result<Self, JobError> {
        let job: ScanJob = serde_json::from_str(content)?;
        job.detector.validate()?;
        Ok(job)
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(JobError::UnsupportedFileFormat),
        }
    }

    /// Convert the job to a TOML string
    pub fn to_toml(&self) -> Result<String, JobError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Save the job to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), JobError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// The pages this job scans
    pub fn page_source(&self) -> Result<ImageFileSource, JobError> {
        if !self.pages.is_empty() {
            return Ok(ImageFileSource::new(self.pages.clone()));
        }
        match &self.pages_dir {
            Some(dir) => Ok(ImageFileSource::from_dir(dir)?),
            None => Err(JobError::MissingPages),
        }
    }
}
