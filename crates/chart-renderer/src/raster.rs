//! Raster output formats for map images.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

use crate::error::{RenderError, RenderResult};
use crate::png::encode_png;

/// JPEG quality (0-100).
pub const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    /// `image/png` / `image/jpeg` (and `image/jpg`); other MIME types are not raster outputs.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" | "png" => Some(RasterFormat::Png),
            "image/jpeg" | "image/jpg" | "jpeg" | "jpg" => Some(RasterFormat::Jpeg),
            _ => None,
        }
    }

    pub fn encode(&self, pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
        match self {
            RasterFormat::Png => encode_png(pixels, width, height),
            RasterFormat::Jpeg => encode_jpeg(pixels, width, height, JPEG_QUALITY),
        }
    }
}

/// Encode RGBA pixels as JPEG, compositing alpha onto white.
pub fn encode_jpeg(pixels: &[u8], width: usize, height: usize, quality: u8) -> RenderResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    let expected = width * height * 4;
    if pixels.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: pixels.len(),
        });
    }

    let rgb: Vec<u8> = pixels
        .chunks_exact(4)
        .flat_map(|px| {
            let alpha = px[3] as f32 / 255.0;
            let over_white = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
            [over_white(px[0]), over_white(px[1]), over_white(px[2])]
        })
        .collect();

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality.min(100));
    encoder
        .encode(&rgb, width as u32, height as u32, ColorType::Rgb8)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_lookup() {
        assert_eq!(RasterFormat::from_mime("IMAGE/PNG"), Some(RasterFormat::Png));
        assert_eq!(RasterFormat::from_mime("image/jpeg"), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_mime("image/svg+xml"), None);
    }

    #[test]
    fn jpeg_has_soi_marker() {
        let pixels = vec![0u8; 8 * 8 * 4];
        let jpeg = encode_jpeg(&pixels, 8, 8, 80).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn jpeg_rejects_short_buffer() {
        assert!(matches!(
            encode_jpeg(&[0; 4], 2, 2, 80),
            Err(RenderError::BufferSize { expected: 16, actual: 4 })
        ));
    }
}
