//! Isolines over depth grids using marching squares.
//!
//! Segment endpoints are in grid space: `x` is the column, `y` the row,
//! cell corners sitting on integer coordinates.

use crate::grid::DepthGrid;

/// A line segment between two grid-space points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl Segment {
    /// Scale both endpoints, e.g. from grid space into pixel space.
    pub fn scaled(&self, sx: f64, sy: f64) -> Segment {
        Segment {
            start: (self.start.0 * sx, self.start.1 * sy),
            end: (self.end.0 * sx, self.end.1 * sy),
        }
    }
}

/// Segments of the isoline at `level`.
pub fn march_squares(grid: &DepthGrid, level: f32) -> Vec<Segment> {
    let (width, height) = (grid.width, grid.height);
    if width < 2 || height < 2 || grid.values.len() != width * height {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let tl = grid.get(x, y);
            let tr = grid.get(x + 1, y);
            let bl = grid.get(x, y + 1);
            let br = grid.get(x + 1, y + 1);
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }
            cell_segments(case, x as f64, y as f64, [tl, tr, br, bl], level, &mut segments);
        }
    }
    segments
}

fn cell_segments(case: u8, x: f64, y: f64, corners: [f32; 4], level: f32, out: &mut Vec<Segment>) {
    let [tl, tr, br, bl] = corners;
    let top = || crossing((x, y), (x + 1.0, y), tl, tr, level);
    let right = || crossing((x + 1.0, y), (x + 1.0, y + 1.0), tr, br, level);
    let bottom = || crossing((x, y + 1.0), (x + 1.0, y + 1.0), bl, br, level);
    let left = || crossing((x, y), (x, y + 1.0), tl, bl, level);
    let mut push = |start, end| out.push(Segment { start, end });

    match case {
        1 | 14 => push(left(), top()),
        2 | 13 => push(top(), right()),
        3 | 12 => push(left(), right()),
        4 | 11 => push(right(), bottom()),
        5 => {
            push(left(), top());
            push(right(), bottom());
        }
        6 | 9 => push(top(), bottom()),
        7 | 8 => push(left(), bottom()),
        10 => {
            push(top(), right());
            push(left(), bottom());
        }
        _ => {}
    }
}

fn crossing(a: (f64, f64), b: (f64, f64), va: f32, vb: f32, level: f32) -> (f64, f64) {
    if (vb - va).abs() < 1e-6 {
        return ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    }
    let t = ((level - va) / (vb - va)).clamp(0.0, 1.0) as f64;
    (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}
