use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{DetectError, Result};

/// Pixel layout of a raw page buffer handed over by a rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ChannelLayout {
    Gray,
    Rgb,
    Rgba,
    Bgr,
    Bgra,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }
}

/// A single rendered page. Lives only as long as its page is being scanned.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number
    pub page_index: usize,
    /// Total number of pages in the source document
    pub page_count: usize,
    pub pixels: RgbImage,
}

impl PageImage {
    pub fn new(page_index: usize, page_count: usize, pixels: RgbImage) -> Self {
        Self {
            page_index,
            page_count,
            pixels,
        }
    }

    /// Build a page from a raw interleaved buffer.
    pub fn from_raw(
        page_index: usize,
        page_count: usize,
        width: u32,
        height: u32,
        layout: ChannelLayout,
        data: &[u8],
    ) -> Result<Self> {
        let expected = width as usize * height as usize * layout.channels();
        if width == 0 || height == 0 || data.len() != expected {
            return Err(DetectError::PageDecode {
                page_index,
                reason: format!(
                    "expected {expected} bytes for {width}x{height} {layout}, got {}",
                    data.len()
                ),
            });
        }

        let mut pixels = RgbImage::new(width, height);
        let stride = layout.channels();
        for (dst, src) in pixels.pixels_mut().zip(data.chunks_exact(stride)) {
            dst.0 = match layout {
                ChannelLayout::Gray => [src[0], src[0], src[0]],
                ChannelLayout::Rgb | ChannelLayout::Rgba => [src[0], src[1], src[2]],
                ChannelLayout::Bgr | ChannelLayout::Bgra => [src[2], src[1], src[0]],
            };
        }

        Ok(Self::new(page_index, page_count, pixels))
    }

    /// Decode a page from an encoded image (PNG, JPEG, TIFF).
    pub fn from_encoded(page_index: usize, page_count: usize, bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| DetectError::PageDecode {
            page_index,
            reason: e.to_string(),
        })?;
        Ok(Self::new(page_index, page_count, img.to_rgb8()))
    }

    /// Load a page from an image file on disk.
    pub fn open<P: AsRef<Path>>(page_index: usize, page_count: usize, path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| DetectError::PageDecode {
            page_index,
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(Self::new(page_index, page_count, img.to_rgb8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Horizontal and vertical line structure isolated from a binary mask.
#[derive(Debug, Clone)]
pub struct LineMasks {
    pub horizontal: GrayImage,
    pub vertical: GrayImage,
}

/// Axis-aligned rectangle in page pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// A box proposed as possibly containing a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateRegion {
    pub page_index: usize,
    pub sequence_index: usize,
    pub bbox: BoundingBox,
    /// Number of line crossings inside the box, only measured in strict mode
    pub joint_count: Option<u32>,
}

/// An accepted candidate cropped out of its page and written to disk.
#[derive(Debug, Clone)]
pub struct CroppedArtifact {
    pub region: CandidateRegion,
    /// The area actually cropped, which extends above the region to catch captions
    pub crop: BoundingBox,
    /// PNG-encoded crop
    pub encoded: Vec<u8>,
    pub path: PathBuf,
}

impl CroppedArtifact {
    pub fn crop_y0(&self) -> u32 {
        self.crop.y
    }

    pub fn record(&self) -> CandidateRecord {
        CandidateRecord {
            page_index: self.region.page_index,
            sequence_index: self.region.sequence_index,
            bbox: self.region.bbox,
            joint_count: self.region.joint_count,
            file_path: self.path.clone(),
        }
    }
}

/// The per-artifact record handed to downstream classifiers and analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateRecord {
    pub page_index: usize,
    pub sequence_index: usize,
    pub bbox: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_count: Option<u32>,
    pub file_path: PathBuf,
}

/// Deterministic artifact file name for a candidate.
pub fn artifact_file_name(page_index: usize, sequence_index: usize) -> String {
    format!("p{page_index}_cand_{sequence_index}.png")
}
