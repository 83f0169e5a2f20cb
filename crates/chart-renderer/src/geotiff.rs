//! Single-strip float32 GeoTIFF writer (little-endian, EPSG:4326).

use crate::error::{RenderError, RenderResult};
use crate::grid::DepthGrid;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

const ENTRY_COUNT: usize = 14;
const IFD_OFFSET: usize = 8;
const IFD_SIZE: usize = 2 + ENTRY_COUNT * 12 + 4;
const PIXEL_SCALE_OFFSET: usize = IFD_OFFSET + IFD_SIZE;
const TIEPOINT_OFFSET: usize = PIXEL_SCALE_OFFSET + 3 * 8;
const GEOKEY_OFFSET: usize = TIEPOINT_OFFSET + 6 * 8;
const STRIP_OFFSET: usize = GEOKEY_OFFSET + 16 * 2;

/// GeoKeyDirectory: version 1.1.0, 3 keys; model type geographic,
/// raster type pixel-is-area, geographic CRS 4326.
const GEO_KEYS: [u16; 16] = [
    1, 1, 0, 3, //
    1024, 0, 1, 2, //
    1025, 0, 1, 1, //
    2048, 0, 1, 4326,
];

enum Value {
    Short(u16),
    Long(u32),
    Offset { count: u32, offset: u32 },
}

/// Encode `grid` as a GeoTIFF with a single uncompressed strip.
pub fn encode_geotiff(grid: &DepthGrid) -> RenderResult<Vec<u8>> {
    let (w, h) = (grid.width, grid.height);
    if w == 0 || h == 0 {
        return Err(RenderError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    if grid.values.len() != w * h {
        return Err(RenderError::BufferSize {
            expected: w * h,
            actual: grid.values.len(),
        });
    }
    let strip_bytes = w * h * 4;

    let entries: [(u16, u16, Value); ENTRY_COUNT] = [
        (256, TYPE_LONG, Value::Long(w as u32)),
        (257, TYPE_LONG, Value::Long(h as u32)),
        (258, TYPE_SHORT, Value::Short(32)),
        (259, TYPE_SHORT, Value::Short(1)),
        (262, TYPE_SHORT, Value::Short(1)),
        (273, TYPE_LONG, Value::Long(STRIP_OFFSET as u32)),
        (277, TYPE_SHORT, Value::Short(1)),
        (278, TYPE_LONG, Value::Long(h as u32)),
        (279, TYPE_LONG, Value::Long(strip_bytes as u32)),
        (284, TYPE_SHORT, Value::Short(1)),
        (339, TYPE_SHORT, Value::Short(3)),
        (
            33550,
            TYPE_DOUBLE,
            Value::Offset {
                count: 3,
                offset: PIXEL_SCALE_OFFSET as u32,
            },
        ),
        (
            33922,
            TYPE_DOUBLE,
            Value::Offset {
                count: 6,
                offset: TIEPOINT_OFFSET as u32,
            },
        ),
        (
            34735,
            TYPE_SHORT,
            Value::Offset {
                count: GEO_KEYS.len() as u32,
                offset: GEOKEY_OFFSET as u32,
            },
        ),
    ];

    let mut out = Vec::with_capacity(STRIP_OFFSET + strip_bytes);
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&(IFD_OFFSET as u32).to_le_bytes());

    out.extend_from_slice(&(ENTRY_COUNT as u16).to_le_bytes());
    for (tag, kind, value) in &entries {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        match value {
            Value::Short(v) => {
                out.extend_from_slice(&1u32.to_le_bytes());
                out.extend_from_slice(&v.to_le_bytes());
                out.extend_from_slice(&[0, 0]);
            }
            Value::Long(v) => {
                out.extend_from_slice(&1u32.to_le_bytes());
                out.extend_from_slice(&v.to_le_bytes());
            }
            Value::Offset { count, offset } => {
                out.extend_from_slice(&count.to_le_bytes());
                out.extend_from_slice(&offset.to_le_bytes());
            }
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    debug_assert_eq!(out.len(), PIXEL_SCALE_OFFSET);

    let bbox = grid.bbox;
    for v in [bbox.width() / w as f64, bbox.height() / h as f64, 0.0] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in [0.0, 0.0, 0.0, bbox.min_x, bbox.max_y, 0.0] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in GEO_KEYS {
        out.extend_from_slice(&v.to_le_bytes());
    }
    debug_assert_eq!(out.len(), STRIP_OFFSET);

    out.extend_from_slice(&grid.to_le_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogc_common::BoundingBox;

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([buf[at], buf[at + 1]])
    }

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    fn f64_at(buf: &[u8], at: usize) -> f64 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&buf[at..at + 8]);
        f64::from_le_bytes(b)
    }

    #[test]
    fn layout_matches_header_offsets() {
        let grid = DepthGrid::synthetic(BoundingBox::new(121.0, 31.0, 122.0, 32.0), 4, 2);
        let tiff = encode_geotiff(&grid).unwrap();

        assert_eq!(&tiff[..4], b"II*\0");
        assert_eq!(u32_at(&tiff, 4), 8);
        assert_eq!(u16_at(&tiff, 8), 14);
        assert_eq!(STRIP_OFFSET, 286);
        assert_eq!(tiff.len(), 286 + 4 * 2 * 4);

        let tags: Vec<u16> = (0..14).map(|i| u16_at(&tiff, 10 + i * 12)).collect();
        assert_eq!(
            tags,
            vec![256, 257, 258, 259, 262, 273, 277, 278, 279, 284, 339, 33550, 33922, 34735]
        );
        // width, strip offset
        assert_eq!(u32_at(&tiff, 10 + 8), 4);
        assert_eq!(u32_at(&tiff, 10 + 5 * 12 + 8), 286);

        assert_eq!(f64_at(&tiff, 182), 0.25);
        assert_eq!(f64_at(&tiff, 190), 0.5);
        assert_eq!(f64_at(&tiff, 206 + 24), 121.0);
        assert_eq!(f64_at(&tiff, 206 + 32), 32.0);
        assert_eq!(u16_at(&tiff, 254 + 15 * 2), 4326);

        let first = f32::from_le_bytes([tiff[286], tiff[287], tiff[288], tiff[289]]);
        assert_eq!(first, grid.values[0]);
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let grid = DepthGrid {
            width: 3,
            height: 3,
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            values: vec![0.0; 4],
        };
        assert!(matches!(
            encode_geotiff(&grid),
            Err(RenderError::BufferSize { expected: 9, .. })
        ));
    }
}
