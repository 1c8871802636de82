// SPDX-License-Identifier: MIT
//
// Codec boundary — raster decode/encode via the `image` crate.
//
// Decoding forces RGBA: whatever the source format carries, the canvas
// always has four channels per pixel. Encoding supports the four formats
// the save dialog offers. JPEG cannot represent alpha, so the channel is
// dropped at encode time.
//
// All `image` errors are wrapped into `io::Error` here — the rest of the
// editor only ever sees `io::Result`.

use std::io;
use std::path::Path;

use image::{ColorType, ImageFormat};

use crate::canvas::Canvas;

// ─── SaveFormat ─────────────────────────────────────────────────────────────

/// Output format for the save dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Bmp,
    Tga,
    Jpeg,
}

impl SaveFormat {
    /// All formats, in save-dialog order.
    pub const ALL: [Self; 4] = [Self::Png, Self::Bmp, Self::Tga, Self::Jpeg];

    /// Human-readable name for the save dialog and status messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Bmp => "BMP",
            Self::Tga => "TGA",
            Self::Jpeg => "JPEG",
        }
    }

    const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tga => ImageFormat::Tga,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

// ─── Decode / Encode ────────────────────────────────────────────────────────

/// Decode a raster image file into a canvas, forcing RGBA.
///
/// # Errors
///
/// Returns an error if the file is missing, corrupt, in an unsupported
/// format, or has a zero dimension.
pub fn decode(path: &Path) -> io::Result<Canvas> {
    let img = image::open(path).map_err(io::Error::other)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    if width == 0 || height == 0 {
        return Err(io::Error::other("image has a zero dimension"));
    }

    Ok(Canvas::from_raw(width, height, rgba.as_raw()))
}

/// Encode a canvas to disk in the given format.
///
/// # Errors
///
/// Returns an error if the encoder fails or the file cannot be written.
pub fn encode(format: SaveFormat, path: &Path, canvas: &Canvas) -> io::Result<()> {
    let width = canvas.width();
    let height = canvas.height();

    match format {
        SaveFormat::Jpeg => {
            // JPEG has no alpha channel — strip it.
            let raw = canvas.raw_rgba();
            let mut rgb = Vec::with_capacity(raw.len() / 4 * 3);
            for px in raw.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
            }
            image::save_buffer_with_format(
                path,
                &rgb,
                width,
                height,
                ColorType::Rgb8,
                ImageFormat::Jpeg,
            )
        }
        _ => image::save_buffer_with_format(
            path,
            &canvas.raw_rgba(),
            width,
            height,
            ColorType::Rgba8,
            format.image_format(),
        ),
    }
    .map_err(io::Error::other)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
