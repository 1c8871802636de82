// SPDX-License-Identifier: MIT
//
// Rgba — one image pixel, four 8-bit channels.

/// An RGBA pixel. Plain value type, copied everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque black — the default primary and secondary color.
    pub const OPAQUE_BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Create a pixel from its four channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The channel-inverted color, ignoring alpha.
    ///
    /// Used to draw the cursor glyph so it stays visible on any pixel:
    /// the inverse of a color always contrasts with it.
    #[inline]
    #[must_use]
    pub const fn inverted(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
            a: self.a,
        }
    }
}

impl Default for Rgba {
    #[inline]
    fn default() -> Self {
        Self::OPAQUE_BLACK
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
