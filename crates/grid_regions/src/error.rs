use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Failed to decode page {page_index}: {reason}")]
    PageDecode { page_index: usize, reason: String },

    #[error("Failed to encode artifact: {0}")]
    ArtifactEncode(#[from] image::ImageError),

    #[error("Failed to write artifact {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported configuration format. Please use .toml or .json files")]
    UnsupportedConfigFormat,

    #[error("Failed to parse TOML configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DetectError>;
