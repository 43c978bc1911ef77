use std::path::PathBuf;

use crate::{
    error::{DetectError, Result},
    traits::PageSource,
    types::PageImage,
};

/// Pages that are already rendered and decoded.
#[derive(Debug, Clone, Default)]
pub struct MemoryPageSource {
    pages: Vec<PageImage>,
}

impl MemoryPageSource {
    /// Pages are taken in order; their indices are renumbered 1..=n.
    pub fn new(pages: Vec<PageImage>) -> Self {
        let page_count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| PageImage::new(i + 1, page_count, page.pixels))
            .collect();
        Self { pages }
    }
}

impl PageSource for MemoryPageSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, page_index: usize) -> Result<PageImage> {
        page_index
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .cloned()
            .ok_or_else(|| DetectError::PageDecode {
                page_index,
                reason: "page index out of range".to_string(),
            })
    }
}

/// One image file per page, e.g. the output directory of a rasterizer.
#[derive(Debug, Clone, Default)]
pub struct ImageFileSource {
    paths: Vec<PathBuf>,
}

impl ImageFileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Every PNG/JPEG/TIFF file in `dir`, sorted by file name.
    pub fn from_dir<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        matches!(
                            ext.to_ascii_lowercase().as_str(),
                            "png" | "jpg" | "jpeg" | "tif" | "tiff"
                        )
                    })
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl PageSource for ImageFileSource {
    fn page_count(&self) -> usize {
        self.paths.len()
    }

    fn load_page(&self, page_index: usize) -> Result<PageImage> {
        let path = page_index
            .checked_sub(1)
            .and_then(|i| self.paths.get(i))
            .ok_or_else(|| DetectError::PageDecode {
                page_index,
                reason: "page index out of range".to_string(),
            })?;
        PageImage::open(page_index, self.paths.len(), path)
    }
}
