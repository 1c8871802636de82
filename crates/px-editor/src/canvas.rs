// SPDX-License-Identifier: MIT
//
// Canvas — the pixel buffer backing one open document.
//
// A dense row-major array of RGBA pixels, sized once at creation (by the
// decode result) and never resized. Coordinates are absolute buffer
// coordinates, independent of scrolling.
//
// Bounds are a caller-guaranteed precondition: the navigation layer clamps
// every cursor and viewport coordinate before it reaches the canvas, so an
// out-of-range `get`/`set` here is a programming error and panics via
// checked indexing. The canvas never clamps silently.

use crate::pixel::Rgba;

/// A fixed-size 2D pixel buffer, exclusively owned by one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Create a canvas filled with a single color.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        assert!(width > 0 && height > 0, "canvas dimensions must be nonzero");
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![fill; size],
        }
    }

    /// Build a canvas from raw RGBA bytes (the codec's decode output).
    ///
    /// # Panics
    ///
    /// Panics if a dimension is zero or `raw.len() != width * height * 4`.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, raw: &[u8]) -> Self {
        assert!(width > 0 && height > 0, "canvas dimensions must be nonzero");
        let size = width as usize * height as usize;
        assert_eq!(raw.len(), size * 4, "raw RGBA length mismatch");

        let pixels = raw
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major index of `(x, y)`. Caller guarantees in-bounds.
    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// The pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds — a precondition violation,
    /// not a recoverable error.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        let idx = self.index(x, y);
        self.pixels[idx]
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba) {
        let idx = self.index(x, y);
        self.pixels[idx] = pixel;
    }

    /// The pixel data as a flat RGBA byte vector, for encoding.
    #[must_use]
    pub fn raw_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            out.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        out
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
