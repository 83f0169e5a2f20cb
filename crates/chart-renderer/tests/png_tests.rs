//! Tests for PNG encoding of chart rasters.
//!
//! Covers indexed vs RGBA selection, the parallel palette path and
//! decoding the IDAT stream back to scanlines.

use std::io::Read;

use chart_renderer::png::{encode_indexed, encode_png, encode_rgba};
use chart_renderer::{Color, ColorScale, DepthGrid, RenderError};
use flate2::read::ZlibDecoder;
use ogc_common::BoundingBox;

// ============================================================================
// Helper functions
// ============================================================================

/// Walk PNG chunks, returning `(type, data)` pairs.
fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    let mut out = Vec::new();
    let mut at = 8;
    while at + 8 <= png.len() {
        let len = u32::from_be_bytes([png[at], png[at + 1], png[at + 2], png[at + 3]]) as usize;
        let mut kind = [0u8; 4];
        kind.copy_from_slice(&png[at + 4..at + 8]);
        out.push((kind, png[at + 8..at + 8 + len].to_vec()));
        at += 12 + len;
    }
    out
}

fn color_type(png: &[u8]) -> u8 {
    png[25]
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

/// Every pixel a distinct color, forcing the RGBA path.
fn noisy_pixels(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| [(i % 256) as u8, (i / 256 % 256) as u8, 7, 255])
        .collect()
}

// ============================================================================
// Format selection
// ============================================================================

#[test]
fn test_few_colors_encode_indexed() {
    let pixels = [
        255, 0, 0, 255, //
        0, 0, 255, 255, //
        0, 0, 255, 255, //
        255, 0, 0, 255,
    ];
    let png = encode_png(&pixels, 2, 2).unwrap();
    assert_eq!(color_type(&png), 3);

    let kinds: Vec<[u8; 4]> = chunks(&png).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![*b"IHDR", *b"PLTE", *b"IDAT", *b"IEND"]);
}

#[test]
fn test_translucent_palette_writes_trns() {
    let pixels = [0, 0, 0, 0, 10, 20, 30, 255];
    let png = encode_png(&pixels, 2, 1).unwrap();
    let trns = chunks(&png).into_iter().find(|(k, _)| k == b"tRNS");
    assert!(trns.is_some());
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let pixels = noisy_pixels(32, 32);
    let png = encode_png(&pixels, 32, 32).unwrap();
    assert_eq!(color_type(&png), 6);
}

#[test]
fn test_parallel_palette_matches_sequential_layout() {
    // 128x128 crosses the parallel threshold
    let grid = DepthGrid::synthetic(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 128, 128);
    let quantized: Vec<u8> = grid
        .values
        .iter()
        .flat_map(|v| {
            let c = ColorScale::Turbo.sample((-v / 40.0).round() / 4.0);
            [c.r, c.g, c.b, c.a]
        })
        .collect();
    let png = encode_png(&quantized, 128, 128).unwrap();
    assert_eq!(color_type(&png), 3);

    let (_, idat) = chunks(&png).into_iter().find(|(k, _)| k == b"IDAT").unwrap();
    let raw = inflate(&idat);
    // one filter byte per scanline plus one index per pixel
    assert_eq!(raw.len(), 128 * (128 + 1));
}

// ============================================================================
// Scanline content
// ============================================================================

#[test]
fn test_rgba_scanlines_round_trip_through_zlib() {
    let pixels = noisy_pixels(3, 2);
    let png = encode_rgba(&pixels, 3, 2).unwrap();
    let (_, idat) = chunks(&png).into_iter().find(|(k, _)| k == b"IDAT").unwrap();
    let raw = inflate(&idat);
    assert_eq!(raw.len(), 2 * (1 + 3 * 4));
    assert_eq!(raw[0], 0);
    assert_eq!(&raw[1..13], &pixels[0..12]);
}

#[test]
fn test_indexed_rejects_short_buffer() {
    let palette = [Color::rgb(1, 2, 3)];
    let err = encode_indexed(4, 4, &palette, &[0; 3]).unwrap_err();
    assert!(matches!(err, RenderError::BufferSize { expected: 16, actual: 3 }));
}

#[test]
fn test_zero_dimensions_rejected() {
    assert!(matches!(
        encode_png(&[], 0, 5),
        Err(RenderError::InvalidDimensions { width: 0, height: 5 })
    ));
}
