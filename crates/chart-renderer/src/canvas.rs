//! Minimal RGBA raster used for chart overview images.

use ogc_common::BoundingBox;

use crate::color::Color;
use crate::error::{RenderError, RenderResult};
use crate::png::encode_png;
use crate::raster::RasterFormat;

/// Row-major RGBA canvas with its origin at the top-left corner.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Color::new(p[0], p[1], p[2], p[3]))
    }

    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Source-over blend of a single pixel; out-of-bounds writes are ignored.
    pub fn blend(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 4;
        let dst = &mut self.pixels[i..i + 4];
        if color.a == 255 || dst[3] == 0 {
            dst.copy_from_slice(&[color.r, color.g, color.b, color.a]);
            return;
        }
        let sa = color.a as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8
        };
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }

    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.blend(x, y, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        self.line(x0, y0, x1, y0, color);
        self.line(x1, y0, x1, y1, color);
        self.line(x1, y1, x0, y1, color);
        self.line(x0, y1, x0, y0, color);
    }

    /// Bresenham line, endpoints inclusive.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.blend(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], color: Color) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            self.line(
                a.0.round() as i64,
                a.1.round() as i64,
                b.0.round() as i64,
                b.1.round() as i64,
                color,
            );
        }
    }

    /// Even-odd scanline fill sampled at pixel centres.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let y_start = min_y.floor().max(0.0) as i64;
        let y_end = max_y.ceil().min(self.height as f64) as i64;

        let mut crossings = Vec::new();
        for y in y_start..y_end {
            let cy = y as f64 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= cy && by > cy) || (by <= cy && ay > cy) {
                    crossings.push(ax + (cy - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil() as i64;
                let end = (span[1] - 0.5).floor() as i64;
                for x in start.max(0)..=end.min(self.width as i64 - 1) {
                    self.blend(x, y, color);
                }
            }
        }
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        encode_png(&self.pixels, self.width, self.height)
    }

    pub fn encode(&self, format: RasterFormat) -> RenderResult<Vec<u8>> {
        format.encode(&self.pixels, self.width, self.height)
    }
}

/// Maps geographic coordinates onto a `width` x `height` pixel grid.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub bbox: BoundingBox,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(bbox: BoundingBox, width: usize, height: usize) -> Self {
        Self {
            bbox,
            width,
            height,
        }
    }

    /// Pixel position of `(lon, lat)`; y grows southward.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let w = self.bbox.width().max(f64::EPSILON);
        let h = self.bbox.height().max(f64::EPSILON);
        (
            (lon - self.bbox.min_x) / w * self.width as f64,
            (self.bbox.max_y - lat) / h * self.height as f64,
        )
    }

    pub fn project_all<'a, I>(&self, positions: I) -> Vec<(f64, f64)>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        positions
            .into_iter()
            .filter(|p| p.len() >= 2)
            .map(|p| self.project(p[0], p[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn rejects_empty_canvas() {
        assert!(Canvas::new(0, 10).is_err());
    }

    #[test]
    fn fill_polygon_covers_interior_only() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.fill_polygon(&[(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)], RED);
        assert_eq!(canvas.pixel(5, 5), Some(RED));
        assert_eq!(canvas.pixel(2, 2), Some(RED));
        assert_eq!(canvas.pixel(8, 8), Some(Color::transparent()));
        assert_eq!(canvas.pixel(0, 0), Some(Color::transparent()));
    }

    #[test]
    fn line_is_clipped() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.line(-5, 1, 10, 1, RED);
        for x in 0..4 {
            assert_eq!(canvas.pixel(x, 1), Some(RED));
        }
        assert_eq!(canvas.pixel(0, 0), Some(Color::transparent()));
    }

    #[test]
    fn blend_half_alpha_over_opaque() {
        let mut canvas = Canvas::new(1, 1).unwrap();
        canvas.fill(Color::rgb(0, 0, 0));
        canvas.blend(0, 0, Color::new(200, 100, 0, 128));
        let px = canvas.pixel(0, 0).unwrap();
        assert_eq!(px.a, 255);
        assert!((px.r as i32 - 100).abs() <= 1);
    }

    #[test]
    fn viewport_maps_corners() {
        let vp = Viewport::new(BoundingBox::new(120.0, 30.0, 122.0, 32.0), 200, 100);
        assert_eq!(vp.project(120.0, 32.0), (0.0, 0.0));
        assert_eq!(vp.project(122.0, 30.0), (200.0, 100.0));
    }

    #[test]
    fn to_png_writes_signature() {
        let mut canvas = Canvas::new(3, 3).unwrap();
        canvas.fill(RED);
        let png = canvas.to_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
