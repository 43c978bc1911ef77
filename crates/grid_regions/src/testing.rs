//! Synthetic page drawing for tests.

use image::{Rgb, RgbImage};
use crate::types::PageImage;

const INK: Rgb<u8> = Rgb([0, 0, 0]);

pub fn blank_page(page_index: usize, width: u32, height: u32) -> PageImage {
    PageImage::new(page_index, page_index, RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
}

pub fn fill_block(page: &mut PageImage, x: u32, y: u32, width: u32, height: u32) {
    for yy in y..y + height {
        for xx in x..x + width {
            page.pixels.put_pixel(xx, yy, INK);
        }
    }
}

/// Rectangle outline whose lines start at `x0`/`y0`/`x1`/`y1` and are `t` pixels thick.
pub fn draw_outline(page: &mut PageImage, x0: u32, y0: u32, x1: u32, y1: u32, t: u32) {
    draw_grid(page, x0, y0, x1, y1, 2, 2, t);
}

/// `h_lines` evenly spaced horizontal rulings and `v_lines` vertical ones
/// between `(x0, y0)` and `(x1, y1)`, each `t` pixels thick.
#[allow(clippy::too_many_arguments)]
pub fn draw_grid(
    page: &mut PageImage,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    h_lines: u32,
    v_lines: u32,
    t: u32,
) {
    for i in 0..h_lines {
        let y = y0 + (y1 - y0) * i / (h_lines - 1);
        fill_block(page, x0, y, x1 + t - x0, t);
    }
    for i in 0..v_lines {
        let x = x0 + (x1 - x0) * i / (v_lines - 1);
        fill_block(page, x, y0, t, y1 + t - y0);
    }
}
