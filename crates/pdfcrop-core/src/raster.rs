//! Raster-approximate extent: the ink box of a rendered grayscale page.

use crate::geometry::Rect;

/// Value of a background pixel.
pub const WHITE: u8 = 255;

/// Single-channel 8-bit image. Row 0 is the top of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height` bytes.
    pub pixels: Vec<u8>,
}

impl GrayImage {
    /// An all-white image.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![WHITE; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = value;
        }
    }

    fn row(&self, y: u32) -> &[u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        self.pixels.get(start..start + w).unwrap_or(&[])
    }
}

/// Page-space box of every non-white pixel of `image`, rendered from `media`
/// at `scale` pixels per unit. Returns `None` for an all-white image.
pub fn raster_bounds(image: &GrayImage, media: &Rect, scale: f64) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut max_x = 0u32;
    let mut min_row = u32::MAX;
    let mut max_row = 0u32;

    for y in 0..image.height {
        let row = image.row(y);
        let Some(first) = row.iter().position(|&v| v != WHITE) else {
            continue;
        };
        let last = row.iter().rposition(|&v| v != WHITE).unwrap_or(first);
        min_x = min_x.min(first as u32);
        max_x = max_x.max(last as u32);
        min_row = min_row.min(y);
        max_row = max_row.max(y);
    }

    if min_x == u32::MAX {
        return None;
    }

    let scale = if scale > 0.0 { scale } else { 1.0 };
    let h = f64::from(image.height);
    // Pixel box [min_x, max_x + 1) x [min_row, max_row + 1), flipped to y-up.
    Some(Rect {
        min_x: media.min_x + f64::from(min_x) / scale,
        max_x: media.min_x + f64::from(max_x + 1) / scale,
        min_y: media.min_y + (h - f64::from(max_row + 1)) / scale,
        max_y: media.min_y + (h - f64::from(min_row)) / scale,
    })
}
