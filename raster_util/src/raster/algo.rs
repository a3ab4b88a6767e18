/*
This file is part of the Land Cover Cross Tabulation Tool
Copyright (C) 2023 the Land Cover Cross Tabulation Tool authors

The Land Cover Cross Tabulation Tool is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use std::ffi::OsString;
use std::fs::{create_dir_all, remove_file, rename};
use std::path::{Path, PathBuf};

use gdal::raster::{reproject, GdalType, RasterCreationOptions};
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::{Dataset, DriverManager};
use log::debug;

use crate::coords::{GeoBox, PixelPoint};
use crate::errors::{GeoError, Result};
use crate::raster::{Raster, RasterStats};

pub const GTIFF_DRIVER: &str = "GTiff";

pub const DEFAULT_RASTER_OPTIONS: [&str; 2] = ["COMPRESS=LZW", "TILED=YES"];

pub fn create_empty_raster<T: GdalType + Copy>(
    raster_path: &Path,
    snap_stats: &RasterStats,
    fill_with_nodata: bool,
) -> Result<Dataset> {
    if let Some(parent) = raster_path.parent() {
        if !parent.exists() {
            create_dir_all(parent)?;
        }
    }

    let drv = DriverManager::get_driver_by_name(GTIFF_DRIVER)?;

    let mut ds = drv.create_with_band_type_with_options::<T, _>(
        raster_path,
        snap_stats.num_cols as usize,
        snap_stats.num_rows as usize,
        1,
        &RasterCreationOptions::from_iter(DEFAULT_RASTER_OPTIONS),
    )?;

    //because y is the top not the bottom
    assert!(snap_stats.pixel_height < 0.0);

    ds.set_geo_transform(&[
        snap_stats.origin_x,
        snap_stats.pixel_width,
        0.0,
        snap_stats.origin_y,
        0.0,
        snap_stats.pixel_height,
    ])?;
    ds.set_projection(&snap_stats.projection)?;

    let mut band = ds.rasterband(1)?;
    band.set_no_data_value(Some(snap_stats.no_data_value))?;
    if fill_with_nodata {
        band.fill(snap_stats.no_data_value, None)?;
    }
    drop(band);

    Ok(ds)
}

/// Creates a writable raster inheriting projection, band type, pixel size,
/// nodata and color table from `sample`.
///
/// `origin_pixel` overrides only the geo origin of the transform, moving it
/// to that pixel's top left corner in the sample's grid; pixel size is
/// always inherited, never rescaled. `size` overrides the pixel dimensions.
pub fn create_from_sample<T: GdalType + Copy>(
    raster_path: &Path,
    sample: &Raster,
    origin_pixel: Option<PixelPoint>,
    size: Option<(u32, u32)>,
) -> Result<Dataset> {
    let mut stats = sample.stats.clone();

    if let Some(p) = origin_pixel {
        stats.origin_x = sample.stats.calc_x_coord(p.x);
        stats.origin_y = sample.stats.calc_y_coord(p.y);
    }

    if let Some((num_cols, num_rows)) = size {
        stats.num_cols = num_cols;
        stats.num_rows = num_rows;
    }

    let ds = create_empty_raster::<T>(raster_path, &stats, false)?;

    let sample_band = sample.dataset.rasterband(1)?;
    if let Some(color_table) = sample_band.color_table() {
        ds.rasterband(1)?.set_color_table(&color_table);
    }

    Ok(ds)
}

/// Windowed copy of `src` covering `geo_box`, clamped to the source grid.
///
/// The output origin is offset to the window's top left corner, the pixel
/// size is unchanged. Errors with `Geometry` when the box does not overlap
/// the source raster at all.
pub fn crop_to_geo_box<T: GdalType + Copy>(
    src: &Raster,
    geo_box: &GeoBox,
    out_path: &Path,
) -> Result<()> {
    let transform = src.stats.transform();

    let top_left = transform.to_pixel(geo_box.top_left())?;
    let (box_cols, box_rows) = transform.box_size_in_pixels(geo_box)?;

    // clamp to the grid without pulling an out-of-grid origin back inside,
    // so the intersection check below still fires for a disjoint box
    let x0 = top_left.x.max(0);
    let y0 = top_left.y.max(0);
    let x1 = (top_left.x + box_cols as i32).min(src.stats.num_cols as i32);
    let y1 = (top_left.y + box_rows as i32).min(src.stats.num_rows as i32);

    if x1 <= x0 || y1 <= y0 {
        return Err(GeoError::Geometry(format!(
            "crop box {:?} does not intersect raster {:?}",
            geo_box, src.path
        )));
    }

    let (num_cols, num_rows) = ((x1 - x0) as u32, (y1 - y0) as u32);

    debug!(
        "cropping {:?} to window at {},{} size {}x{}",
        src.path, x0, y0, num_cols, num_rows
    );

    let mut data = src.band()?.read_as::<T>(
        (x0 as isize, y0 as isize),
        (num_cols as usize, num_rows as usize),
        (num_cols as usize, num_rows as usize),
        None,
    )?;

    let ds = create_from_sample::<T>(
        out_path,
        src,
        Some(PixelPoint { x: x0, y: y0 }),
        Some((num_cols, num_rows)),
    )?;

    ds.rasterband(1)?.write(
        (0, 0),
        (num_cols as usize, num_rows as usize),
        &mut data,
    )?;

    Ok(())
}

/// `crop_to_geo_box` through the temp file convention, so `out_path` may
/// equal the source path. Takes the handle by value: the source dataset is
/// closed before the canonical path is replaced.
pub fn crop_to_geo_box_committed<T: GdalType + Copy>(
    src: Raster,
    geo_box: &GeoBox,
    out_path: &Path,
) -> Result<()> {
    let temp_path = temp_path_for(out_path);
    crop_to_geo_box::<T>(&src, geo_box, &temp_path)?;
    drop(src);
    commit_temp_file(&temp_path, out_path)
}

/// Warps `src` into `target_projection` (WKT) at `dst_path`.
///
/// The output keeps the source row/column counts; its extent comes from
/// projecting the source corner and edge midpoint coordinates, so the
/// pixel size is re-derived from the projected extent. The destination is
/// pre-filled with the nodata value, which keeps unwarped area background.
pub fn reproject_raster<T: GdalType + Copy>(
    src: &Raster,
    dst_path: &Path,
    target_projection: &str,
) -> Result<()> {
    let src_srs = SpatialRef::from_wkt(&src.stats.projection)?;
    let dst_srs = SpatialRef::from_wkt(target_projection)?;
    let ct = CoordTransform::new(&src_srs, &dst_srs)?;

    let gb = src.stats.geo_box();
    let mid_x = (gb.min.x + gb.max.x) / 2.0;
    let mid_y = (gb.min.y + gb.max.y) / 2.0;

    // corners + edge midpoints, enough for the axis aligned bound
    let mut xs = [
        gb.min.x, mid_x, gb.max.x, gb.min.x, gb.max.x, gb.min.x, mid_x, gb.max.x,
    ];
    let mut ys = [
        gb.max.y, gb.max.y, gb.max.y, mid_y, mid_y, gb.min.y, gb.min.y, gb.min.y,
    ];
    let mut zs = [0.0f64; 8];
    ct.transform_coords(&mut xs, &mut ys, &mut zs)?;

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for i in 0..xs.len() {
        min_x = min_x.min(xs[i]);
        max_x = max_x.max(xs[i]);
        min_y = min_y.min(ys[i]);
        max_y = max_y.max(ys[i]);
    }

    if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite())
        || max_x <= min_x
        || max_y <= min_y
    {
        return Err(GeoError::Geometry(format!(
            "projected extent of {:?} is degenerate",
            src.path
        )));
    }

    let mut dst_stats = src.stats.clone();
    dst_stats.origin_x = min_x;
    dst_stats.origin_y = max_y;
    dst_stats.pixel_width = (max_x - min_x) / src.stats.num_cols as f64;
    dst_stats.pixel_height = -(max_y - min_y) / src.stats.num_rows as f64;
    dst_stats.projection = target_projection.to_string();

    let dst_ds = create_empty_raster::<T>(dst_path, &dst_stats, true)?;

    reproject(&src.dataset, &dst_ds)?;

    Ok(())
}

/// The fixed temp path a stage writes to before committing over `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Commit step of the temp file convention: delete the original, then
/// rename the temp into its place. Called only after the temp file is
/// fully written, so a crash mid-stage never corrupts the canonical path.
pub fn commit_temp_file(temp_path: &Path, final_path: &Path) -> Result<()> {
    if final_path.exists() {
        remove_file(final_path)?;
    }
    rename(temp_path, final_path)?;
    Ok(())
}
