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
use std::fs::remove_file;
use std::path::PathBuf;

use anyhow::Result;
use log::info;
use ndarray::Array2;
use structopt::StructOpt;

use raster_util::coords::{PixelBox, PixelPoint};
use raster_util::errors::GeoError;
use raster_util::raster::{commit_temp_file, crop_to_geo_box, temp_path_for, Raster};

#[derive(StructOpt)]
pub struct CropToMaskArgs {
    #[structopt(parse(from_os_str), long, help = "Binary mask raster, 1 = keep")]
    pub mask: PathBuf,

    #[structopt(parse(from_os_str), long, help = "Data raster to crop alongside the mask")]
    pub data: PathBuf,

    #[structopt(parse(from_os_str), long, help = "Cropped mask output")]
    pub output_mask: PathBuf,

    #[structopt(parse(from_os_str), long, help = "Cropped data output")]
    pub output_data: PathBuf,
}

/// Crops mask and data to the minimal box covering all mask pixels == 1.
/// An empty mask is a fatal geometry error, nothing is written.
pub fn crop_to_mask(args: &CropToMaskArgs) -> Result<()> {
    let mask = Raster::read(&args.mask)?;

    let size = (mask.stats.num_cols as usize, mask.stats.num_rows as usize);
    let mask_data: Array2<u16> = mask
        .band()?
        .read_as::<u16>((0, 0), size, size, None)?
        .to_array()?;

    let mut pixel_box: Option<PixelBox> = None;
    for ((row, col), &v) in mask_data.indexed_iter() {
        if v != 1 {
            continue;
        }
        let p = PixelPoint {
            x: col as i32,
            y: row as i32,
        };
        pixel_box = Some(match pixel_box {
            None => PixelBox::new(p, p),
            Some(b) => PixelBox::new(
                PixelPoint {
                    x: b.min.x.min(p.x),
                    y: b.min.y.min(p.y),
                },
                PixelPoint {
                    x: b.max.x.max(p.x),
                    y: b.max.y.max(p.y),
                },
            ),
        });
    }

    let pixel_box = pixel_box
        .ok_or_else(|| GeoError::Geometry(format!("mask {:?} has no pixels set", args.mask)))?;

    let geo_box = mask.stats.transform().pixel_box_to_geo(&pixel_box);

    info!(
        "mask covers pixels {:?}, cropping to geo box {:?}",
        pixel_box, geo_box
    );

    let data = Raster::read(&args.data)?;

    // both crops must succeed before either canonical output changes
    let temp_data = temp_path_for(&args.output_data);
    let temp_mask = temp_path_for(&args.output_mask);

    crop_to_geo_box::<u16>(&data, &geo_box, &temp_data)?;
    if let Err(e) = crop_to_geo_box::<u16>(&mask, &geo_box, &temp_mask) {
        remove_file(&temp_data)?;
        return Err(e.into());
    }

    drop(data);
    drop(mask);

    commit_temp_file(&temp_data, &args.output_data)?;
    commit_temp_file(&temp_mask, &args.output_mask)?;

    Ok(())
}

#[cfg(test)]
mod crop_to_mask_test {
    use super::*;
    use gdal::raster::GdalDataType;
    use gdal::spatial_ref::SpatialRef;
    use raster_util::raster::{create_test_raster, get_temp_filename, RasterStats};

    fn stats_4x4(projection: String) -> RasterStats {
        RasterStats {
            origin_x: 100.0,
            origin_y: 400.0,
            pixel_width: 10.0,
            pixel_height: -10.0,
            num_rows: 4,
            num_cols: 4,
            no_data_value: 0.,
            gdal_type: GdalDataType::UInt16,
            projection,
        }
    }

    #[test]
    fn test_crop_to_mask() {
        let projection = SpatialRef::from_epsg(32633).unwrap().to_wkt().unwrap();
        let stats = stats_4x4(projection);

        // ones in the centre 2x2 block
        let mask_data = vec![
            0, 0, 0, 0, //
            0, 1, 1, 0, //
            0, 1, 0, 0, //
            0, 0, 0, 0u16,
        ];
        let data_values: Vec<u16> = (1..=16).collect();

        let args = CropToMaskArgs {
            mask: create_test_raster("mask.tif", &stats, &mask_data).unwrap(),
            data: create_test_raster("data.tif", &stats, &data_values).unwrap(),
            output_mask: get_temp_filename("mask_selected.tif"),
            output_data: get_temp_filename("data_selected.tif"),
        };

        crop_to_mask(&args).unwrap();

        let out = Raster::read(&args.output_data).unwrap();
        assert_eq!(out.stats.num_cols, 2);
        assert_eq!(out.stats.num_rows, 2);
        // origin moved to the box's top left corner, pixel size unchanged
        assert_eq!(out.stats.origin_x, 110.0);
        assert_eq!(out.stats.origin_y, 390.0);
        assert_eq!(out.stats.pixel_width, 10.0);

        let window = out
            .band()
            .unwrap()
            .read_as::<u16>((0, 0), (2, 2), (2, 2), None)
            .unwrap();
        assert_eq!(window.data, vec![6, 7, 10, 11]);

        let out_mask = Raster::read(&args.output_mask).unwrap();
        let window = out_mask
            .band()
            .unwrap()
            .read_as::<u16>((0, 0), (2, 2), (2, 2), None)
            .unwrap();
        assert_eq!(window.data, vec![1, 1, 1, 0]);
    }

    #[test]
    fn test_empty_mask_fails_without_writing() {
        let projection = SpatialRef::from_epsg(32633).unwrap().to_wkt().unwrap();
        let stats = stats_4x4(projection);

        let args = CropToMaskArgs {
            mask: create_test_raster("empty_mask.tif", &stats, &[0u16; 16]).unwrap(),
            data: create_test_raster("data2.tif", &stats, &[5u16; 16]).unwrap(),
            output_mask: get_temp_filename("mask_out.tif"),
            output_data: get_temp_filename("data_out.tif"),
        };

        assert!(crop_to_mask(&args).is_err());
        assert!(!args.output_mask.exists());
        assert!(!args.output_data.exists());
    }

    #[test]
    fn test_failed_mask_crop_leaves_data_output_untouched() {
        let projection = SpatialRef::from_epsg(32633).unwrap().to_wkt().unwrap();
        let stats = stats_4x4(projection);

        let mask_data = vec![
            0, 0, 0, 0, //
            0, 1, 1, 0, //
            0, 1, 0, 0, //
            0, 0, 0, 0u16,
        ];

        // the mask output's parent is a plain file, so its crop cannot
        // create the temp raster and the stage fails halfway
        let blocker = get_temp_filename("blocker");
        std::fs::write(&blocker, b"in the way").unwrap();

        let args = CropToMaskArgs {
            mask: create_test_raster("mask3.tif", &stats, &mask_data).unwrap(),
            data: create_test_raster("data3.tif", &stats, &[5u16; 16]).unwrap(),
            output_mask: blocker.join("mask_selected.tif"),
            output_data: get_temp_filename("data_selected3.tif"),
        };

        assert!(crop_to_mask(&args).is_err());

        assert!(!args.output_data.exists());
        assert!(!temp_path_for(&args.output_data).exists());
    }
}
