use image::GrayImage;
use crate::{traits::LineExtractor, types::LineMasks};

/// Direction of a 1-pixel-thick rectangular structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `(length, 1)` element, keeps horizontal runs
    Horizontal,
    /// `(1, length)` element, keeps vertical runs
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Erode,
    Dilate,
}

/// Isolates ruling lines by opening the ink mask with elongated elements.
#[derive(Debug, Clone)]
pub struct MorphologicalLineExtractor {
    pub kernel_length: u32,
    pub iterations: u32,
}

impl Default for MorphologicalLineExtractor {
    fn default() -> Self {
        Self {
            kernel_length: 40,
            iterations: 2,
        }
    }
}

impl LineExtractor for MorphologicalLineExtractor {
    fn extract_lines(&self, mask: &GrayImage) -> LineMasks {
        LineMasks {
            horizontal: open_along(mask, Axis::Horizontal, self.kernel_length, self.iterations),
            vertical: open_along(mask, Axis::Vertical, self.kernel_length, self.iterations),
        }
    }
}

/// Opening with a `length`-long line element along `axis`: `iterations`
/// erosions followed by as many dilations with the reflected element.
///
/// A run survives iff it is at least `iterations * (length - 1) + 1` pixels
/// long, and survivors keep their exact extent.
pub fn open_along(mask: &GrayImage, axis: Axis, length: u32, iterations: u32) -> GrayImage {
    let length = length.max(1) as usize;
    // Anchor at the element centre, matching the usual rectangular kernel convention.
    let before = length / 2;
    let after = length - 1 - before;

    let mut out = mask.clone();
    for _ in 0..iterations {
        out = sweep(&out, axis, before, after, Sweep::Erode);
    }
    for _ in 0..iterations {
        out = sweep(&out, axis, after, before, Sweep::Dilate);
    }
    out
}

/// One erosion or dilation along `axis` with a window covering
/// `[i - before, i + after]`.
///
/// The window is clipped at the image border, which treats outside pixels
/// as foreground for erosion and background for dilation.
fn sweep(mask: &GrayImage, axis: Axis, before: usize, after: usize, op: Sweep) -> GrayImage {
    let (width, height) = (mask.width() as usize, mask.height() as usize);
    let (lines, len) = match axis {
        Axis::Horizontal => (height, width),
        Axis::Vertical => (width, height),
    };
    let index = |line: usize, pos: usize| match axis {
        Axis::Horizontal => line * width + pos,
        Axis::Vertical => pos * width + line,
    };

    let src = mask.as_raw();
    let mut dst = vec![0u8; src.len()];
    // prefix[i] = foreground pixels in positions [0, i)
    let mut prefix = vec![0u32; len + 1];

    for line in 0..lines {
        for pos in 0..len {
            prefix[pos + 1] = prefix[pos] + u32::from(src[index(line, pos)] > 0);
        }
        for pos in 0..len {
            let lo = pos.saturating_sub(before);
            let hi = (pos + after).min(len - 1);
            let count = prefix[hi + 1] - prefix[lo];
            let on = match op {
                Sweep::Erode => count as usize == hi + 1 - lo,
                Sweep::Dilate => count > 0,
            };
            if on {
                dst[index(line, pos)] = 255;
            }
        }
    }

    // Same dimensions as the source, so the buffer always fits.
    GrayImage::from_raw(mask.width(), mask.height(), dst)
        .unwrap_or_else(|| GrayImage::new(mask.width(), mask.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn run_mask(width: u32, runs: &[(u32, u32, u32)]) -> GrayImage {
        // (row, start, len) horizontal runs
        let mut img = GrayImage::new(width, 8);
        for &(row, start, len) in runs {
            for x in start..start + len {
                img.put_pixel(x, row, Luma([255u8]));
            }
        }
        img
    }

    fn row_pixels(img: &GrayImage, row: u32) -> Vec<u32> {
        (0..img.width()).filter(|&x| img.get_pixel(x, row).0[0] == 255).collect()
    }

    #[test]
    fn test_single_iteration_keeps_runs_of_kernel_length() {
        let img = run_mask(200, &[(1, 10, 40), (3, 10, 39)]);
        let opened = open_along(&img, Axis::Horizontal, 40, 1);
        assert_eq!(row_pixels(&opened, 1), (10..50).collect::<Vec<_>>());
        assert!(row_pixels(&opened, 3).is_empty());
    }

    #[test]
    fn test_two_iterations_need_longer_runs() {
        // 2 * (40 - 1) + 1 = 79
        let img = run_mask(300, &[(1, 20, 79), (3, 20, 78)]);
        let opened = open_along(&img, Axis::Horizontal, 40, 2);
        assert_eq!(row_pixels(&opened, 1), (20..99).collect::<Vec<_>>());
        assert!(row_pixels(&opened, 3).is_empty());
    }

    #[test]
    fn test_odd_kernel_restores_exact_extent() {
        let img = run_mask(100, &[(2, 30, 25)]);
        let opened = open_along(&img, Axis::Horizontal, 7, 3);
        assert_eq!(row_pixels(&opened, 2), (30..55).collect::<Vec<_>>());
    }

    #[test]
    fn test_runs_touching_border_survive() {
        let img = run_mask(60, &[(0, 0, 60)]);
        let opened = open_along(&img, Axis::Horizontal, 40, 2);
        assert_eq!(row_pixels(&opened, 0).len(), 60);
    }

    #[test]
    fn test_extractor_separates_axes() {
        let mut img = GrayImage::new(120, 120);
        for i in 10..110 {
            img.put_pixel(i, 60, Luma([255u8]));
            img.put_pixel(60, i, Luma([255u8]));
        }
        // glyph-sized blob
        for y in 20..30 {
            for x in 20..28 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }

        let lines = MorphologicalLineExtractor::default().extract_lines(&img);
        assert_eq!(lines.horizontal.get_pixel(15, 60).0[0], 255);
        assert_eq!(lines.horizontal.get_pixel(60, 15).0[0], 0);
        assert_eq!(lines.vertical.get_pixel(60, 15).0[0], 255);
        assert_eq!(lines.vertical.get_pixel(15, 60).0[0], 0);
        assert_eq!(lines.horizontal.get_pixel(24, 25).0[0], 0);
        assert_eq!(lines.vertical.get_pixel(24, 25).0[0], 0);
    }
}
