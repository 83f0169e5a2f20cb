//! Depth grids: synthetic bathymetry, resampling and color rendering.
//!
//! Grids are row-major with row 0 at the northern edge of `bbox`.
//! Depths are metres, negative below the vertical datum.

use std::f32::consts::TAU;
use std::str::FromStr;

use ogc_common::BoundingBox;
use rayon::prelude::*;

use crate::color::{Color, ColorScale};

/// Resampling method for coverage extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
    Cubic,
}

impl Interpolation {
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Cubic => "cubic",
        }
    }
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nearest-neighbour" | "nearest-neighbor" => Ok(Interpolation::Nearest),
            "bilinear" | "linear" => Ok(Interpolation::Bilinear),
            "cubic" | "bicubic" => Ok(Interpolation::Cubic),
            other => Err(format!("unknown interpolation: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepthGrid {
    pub width: usize,
    pub height: usize,
    pub bbox: BoundingBox,
    pub values: Vec<f32>,
}

impl DepthGrid {
    /// Smooth synthetic seabed: two superimposed sine/cosine swells around -20 m.
    pub fn synthetic(bbox: BoundingBox, width: usize, height: usize) -> Self {
        let mut values = vec![0.0f32; width * height];
        values
            .par_chunks_mut(width.max(1))
            .enumerate()
            .for_each(|(row, out)| {
                let x = row as f32 / height as f32 * TAU;
                for (col, v) in out.iter_mut().enumerate() {
                    let y = col as f32 / width as f32 * TAU;
                    *v = -20.0 - 15.0 * x.sin() * y.cos() - 5.0 * (2.0 * x).sin() * (2.0 * y).cos();
                }
            });
        Self {
            width,
            height,
            bbox,
            values,
        }
    }

    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.values[row * self.width + col]
    }

    /// `(min, max)` over all values, `None` for an empty grid.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Longitude of column centres, west to east.
    pub fn longitudes(&self) -> Vec<f64> {
        axis(self.bbox.min_x, self.bbox.max_x, self.width)
    }

    /// Latitude of row centres, north to south.
    pub fn latitudes(&self) -> Vec<f64> {
        axis(self.bbox.max_y, self.bbox.min_y, self.height)
    }

    /// Resample onto a `width` x `height` grid over the same extent.
    pub fn resample(&self, width: usize, height: usize, method: Interpolation) -> DepthGrid {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let x_ratio = ratio(self.width, width);
        let y_ratio = ratio(self.height, height);

        let mut values = vec![0.0f32; width * height];
        values
            .par_chunks_mut(width.max(1))
            .enumerate()
            .for_each(|(row, out)| {
                let sy = row as f32 * y_ratio;
                for (col, v) in out.iter_mut().enumerate() {
                    let sx = col as f32 * x_ratio;
                    *v = match method {
                        Interpolation::Nearest => self.nearest(sx, sy),
                        Interpolation::Bilinear => self.bilinear(sx, sy),
                        Interpolation::Cubic => self.bicubic(sx, sy),
                    };
                }
            });

        DepthGrid {
            width,
            height,
            bbox: self.bbox,
            values,
        }
    }

    fn clamped(&self, col: isize, row: isize) -> f32 {
        let c = col.clamp(0, self.width as isize - 1) as usize;
        let r = row.clamp(0, self.height as isize - 1) as usize;
        self.get(c, r)
    }

    fn nearest(&self, sx: f32, sy: f32) -> f32 {
        self.clamped(sx.round() as isize, sy.round() as isize)
    }

    fn bilinear(&self, sx: f32, sy: f32) -> f32 {
        let (x0, y0) = (sx.floor() as isize, sy.floor() as isize);
        let (dx, dy) = (sx - x0 as f32, sy - y0 as f32);
        let top = self.clamped(x0, y0) * (1.0 - dx) + self.clamped(x0 + 1, y0) * dx;
        let bottom = self.clamped(x0, y0 + 1) * (1.0 - dx) + self.clamped(x0 + 1, y0 + 1) * dx;
        top * (1.0 - dy) + bottom * dy
    }

    fn bicubic(&self, sx: f32, sy: f32) -> f32 {
        let (x0, y0) = (sx.floor() as isize, sy.floor() as isize);
        let (dx, dy) = (sx - x0 as f32, sy - y0 as f32);
        let mut rows = [0.0f32; 4];
        for (i, r) in rows.iter_mut().enumerate() {
            let yy = y0 - 1 + i as isize;
            *r = catmull_rom(
                self.clamped(x0 - 1, yy),
                self.clamped(x0, yy),
                self.clamped(x0 + 1, yy),
                self.clamped(x0 + 2, yy),
                dx,
            );
        }
        catmull_rom(rows[0], rows[1], rows[2], rows[3], dy)
    }

    /// Raw float32 little-endian samples in row order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// RGBA pixels, shallowest value at the start of the scale.
    pub fn render(&self, scale: ColorScale) -> Vec<u8> {
        let (min, max) = self.range().unwrap_or((0.0, 1.0));
        let span = if (max - min).abs() < 1e-3 { 1.0 } else { max - min };

        let mut pixels = vec![0u8; self.values.len() * 4];
        pixels
            .par_chunks_mut(4)
            .zip(self.values.par_iter())
            .for_each(|(px, &v)| {
                let color: Color = scale.sample((max - v) / span);
                px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
            });
        pixels
    }
}

fn ratio(src: usize, dst: usize) -> f32 {
    if dst <= 1 || src <= 1 {
        0.0
    } else {
        (src - 1) as f32 / (dst - 1) as f32
    }
}

fn axis(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![start];
    }
    (0..n)
        .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
        .collect()
}

fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox::new(121.0, 31.0, 122.0, 32.0)
    }

    #[test]
    fn synthetic_grid_stays_within_swell_bounds() {
        let grid = DepthGrid::synthetic(bbox(), 64, 48);
        assert_eq!(grid.values.len(), 64 * 48);
        let (min, max) = grid.range().unwrap();
        assert!(min >= -40.0 && max <= 0.0, "range {}..{}", min, max);
        assert_eq!(grid.get(0, 0), -20.0);
    }

    #[test]
    fn resample_preserves_corners_bilinear() {
        let grid = DepthGrid::synthetic(bbox(), 10, 10);
        let up = grid.resample(19, 19, Interpolation::Bilinear);
        assert_eq!(up.values.len(), 19 * 19);
        assert!((up.get(0, 0) - grid.get(0, 0)).abs() < 1e-4);
        assert!((up.get(18, 18) - grid.get(9, 9)).abs() < 1e-4);
    }

    #[test]
    fn resample_nearest_only_uses_source_values() {
        let grid = DepthGrid::synthetic(bbox(), 8, 8);
        let down = grid.resample(3, 3, Interpolation::Nearest);
        for v in &down.values {
            assert!(grid.values.contains(v));
        }
    }

    #[test]
    fn cubic_on_constant_grid_is_constant() {
        let grid = DepthGrid {
            width: 4,
            height: 4,
            bbox: bbox(),
            values: vec![-12.5; 16],
        };
        let out = grid.resample(7, 5, Interpolation::Cubic);
        assert!(out.values.iter().all(|v| (v + 12.5).abs() < 1e-4));
    }

    #[test]
    fn axes_run_north_to_south_and_west_to_east() {
        let grid = DepthGrid::synthetic(bbox(), 3, 2);
        assert_eq!(grid.longitudes(), vec![121.0, 121.5, 122.0]);
        assert_eq!(grid.latitudes(), vec![32.0, 31.0]);
    }

    #[test]
    fn render_uses_scale_end_stops() {
        let grid = DepthGrid {
            width: 2,
            height: 1,
            bbox: bbox(),
            values: vec![-5.0, -45.0],
        };
        let px = grid.render(ColorScale::Viridis);
        let stops = ColorScale::Viridis.stops();
        assert_eq!(&px[0..3], &[stops[0].r, stops[0].g, stops[0].b]);
        let last = stops[stops.len() - 1];
        assert_eq!(&px[4..7], &[last.r, last.g, last.b]);
    }

    #[test]
    fn interpolation_names() {
        assert_eq!("BILINEAR".parse::<Interpolation>().unwrap(), Interpolation::Bilinear);
        assert!("lanczos".parse::<Interpolation>().is_err());
    }
}
