//! # Grid Region Candidate Detection
//!
//! Proposes bounding boxes on rasterized document pages that are likely to
//! hold ruled tables, using binary morphology and geometric heuristics only.
//!
//! ## Pipeline
//!
//! 1. **Binarize**: grayscale, Otsu threshold, inverted so ink is foreground
//! 2. **Lines**: opening with long horizontal and vertical elements
//! 3. **Grid**: union of both line masks, dilated to bridge crossings
//! 4. **Regions**: external contours to boxes, minimum size filter
//! 5. **Joints** (strict mode): count line crossings inside each box
//! 6. **Crop**: pad upward for captions, encode PNG, persist
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grid_regions::{Detector, DetectorConfig, FsArtifactSink, ImageFileSource};
//!
//! let detector = Detector::new(DetectorConfig::strict())?;
//! let pages = ImageFileSource::from_dir("rendered_pages")?;
//! let sink = FsArtifactSink::new("extracted_candidates");
//!
//! let report = detector.scan_document(&pages, &sink);
//! for record in report.records() {
//!     println!("{}", serde_json::to_string(&record)?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Stages
//!
//! ```rust,no_run
//! use grid_regions::{Detector, MorphologicalLineExtractor, Strictness};
//!
//! let detector = Detector::builder()
//!     .strictness(Strictness::Strict)
//!     .min_joints(6)
//!     .set_line_extractor(MorphologicalLineExtractor { kernel_length: 25, iterations: 1 })
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;
pub mod document;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use error::{DetectError, Result};
pub use types::*;
pub use config::{DetectorConfig, SequenceScope, Strictness};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Detector, RenderedCandidate, builder::DetectorBuilder};
pub use io::*;
pub use document::{ArtifactFailure, PageFailure, ScanReport};
