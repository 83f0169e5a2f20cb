//! Payload encoders for maritime chart products.
//!
//! - `png`: indexed / RGBA PNG encoding (flate2 + crc32fast)
//! - `raster`: PNG / JPEG selection by MIME type
//! - `canvas`: a small RGBA raster for chart overviews
//! - `color`: named depth color scales
//! - `contour`: marching-squares isolines
//! - `grid`: depth grids, synthetic bathymetry and resampling
//! - `geotiff`, `cdl`: coverage encodings
//! - `svg`: SVG document writer

pub mod canvas;
pub mod cdl;
pub mod color;
pub mod contour;
pub mod error;
pub mod geotiff;
pub mod grid;
pub mod png;
pub mod raster;
pub mod svg;

pub use canvas::{Canvas, Viewport};
pub use cdl::{encode_cdl, CdlMetadata};
pub use color::{Color, ColorScale};
pub use contour::{march_squares, Segment};
pub use error::{RenderError, RenderResult};
pub use grid::{DepthGrid, Interpolation};
pub use geotiff::encode_geotiff;
pub use png::encode_png;
pub use raster::{encode_jpeg, RasterFormat};
pub use svg::SvgDocument;
