//! NetCDF CDL text encoding of a depth grid (`ncgen`-compatible).

use std::fmt::Write;

use crate::grid::DepthGrid;

/// Global attributes and time coordinate for a CDL dump.
#[derive(Debug, Clone, Default)]
pub struct CdlMetadata {
    pub dataset_name: String,
    pub title: String,
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub vertical_datum: Option<String>,
    pub resolution: Option<String>,
}

fn join<T: std::fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn encode_cdl(grid: &DepthGrid, meta: &CdlMetadata) -> String {
    let mut out = String::new();
    // Writing to a String is infallible.
    let _ = write_cdl(&mut out, grid, meta);
    out
}

fn write_cdl(out: &mut String, grid: &DepthGrid, meta: &CdlMetadata) -> std::fmt::Result {
    writeln!(out, "netcdf {} {{", meta.dataset_name)?;
    writeln!(out, "dimensions:")?;
    writeln!(out, "  lon = {};", grid.width)?;
    writeln!(out, "  lat = {};", grid.height)?;
    writeln!(out, "  time = UNLIMITED; // (1 currently)")?;

    writeln!(out, "variables:")?;
    writeln!(out, "  double lon(lon);")?;
    writeln!(out, "    lon:units = \"degrees_east\";")?;
    writeln!(out, "    lon:long_name = \"longitude\";")?;
    writeln!(out, "    lon:standard_name = \"longitude\";")?;
    writeln!(out, "  double lat(lat);")?;
    writeln!(out, "    lat:units = \"degrees_north\";")?;
    writeln!(out, "    lat:long_name = \"latitude\";")?;
    writeln!(out, "    lat:standard_name = \"latitude\";")?;
    writeln!(out, "  double time(time);")?;
    writeln!(out, "    time:units = \"seconds since 1970-01-01 00:00:00\";")?;
    writeln!(out, "    time:calendar = \"gregorian\";")?;
    writeln!(out, "    time:standard_name = \"time\";")?;
    writeln!(out, "  float depth(time, lat, lon);")?;
    writeln!(out, "    depth:units = \"m\";")?;
    writeln!(out, "    depth:long_name = \"bathymetric depth\";")?;
    writeln!(out, "    depth:standard_name = \"sea_floor_depth_below_sea_level\";")?;
    writeln!(out, "    depth:positive = \"down\";")?;
    writeln!(out, "    depth:_FillValue = -9999.f;")?;
    writeln!(out, "    depth:coordinates = \"time lat lon\";")?;
    writeln!(out)?;

    writeln!(out, "// global attributes:")?;
    writeln!(out, "  :title = \"{}\";", quote(&meta.title))?;
    writeln!(out, "  :source = \"S-102 Bathymetric Data\";")?;
    writeln!(out, "  :history = \"Generated from WCS request\";")?;
    writeln!(out, "  :Conventions = \"CF-1.8\";")?;
    writeln!(out, "  :references = \"S-102 Standard Edition 1.0\";")?;
    if let Some(datum) = &meta.vertical_datum {
        writeln!(out, "  :vertical_datum = \"{}\";", quote(datum))?;
    }
    if let Some(resolution) = &meta.resolution {
        writeln!(out, "  :resolution = \"{}\";", quote(resolution))?;
    }
    writeln!(out)?;

    writeln!(out, "data:")?;
    writeln!(out, "  lon = {};", join(grid.longitudes()))?;
    writeln!(out, "  lat = {};", join(grid.latitudes()))?;
    writeln!(out, "  time = {};", meta.time)?;
    writeln!(out, "  depth =")?;
    let rows: Vec<String> = grid
        .values
        .chunks(grid.width.max(1))
        .map(|row| format!("  {}", join(row.iter().map(|v| format!("{:.1}", v)))))
        .collect();
    writeln!(out, "{}", rows.join(",\n"))?;
    writeln!(out, ";")?;
    write!(out, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogc_common::BoundingBox;

    fn meta() -> CdlMetadata {
        CdlMetadata {
            dataset_name: "s102_bathymetry".into(),
            title: "S-102 High Resolution Bathymetry".into(),
            time: 1_700_000_000,
            vertical_datum: Some("MLLW".into()),
            resolution: None,
        }
    }

    #[test]
    fn dump_declares_dimensions_and_data() {
        let grid = DepthGrid::synthetic(BoundingBox::new(121.0, 31.0, 122.0, 32.0), 3, 2);
        let cdl = encode_cdl(&grid, &meta());
        assert!(cdl.starts_with("netcdf s102_bathymetry {"));
        assert!(cdl.contains("  lon = 3;"));
        assert!(cdl.contains("  lat = 2;"));
        assert!(cdl.contains(":vertical_datum = \"MLLW\";"));
        assert!(!cdl.contains(":resolution"));
        assert!(cdl.contains("  lon = 121, 121.5, 122;"));
        assert!(cdl.contains("  time = 1700000000;"));
        assert!(cdl.contains("  -20.0, "));
        assert!(cdl.ends_with('}'));
    }

    #[test]
    fn single_cell_grid_has_finite_axes() {
        let grid = DepthGrid::synthetic(BoundingBox::new(121.0, 31.0, 122.0, 32.0), 1, 1);
        let cdl = encode_cdl(&grid, &meta());
        assert!(cdl.contains("  lon = 121;"));
        assert!(!cdl.contains("NaN"));
    }
}
