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
use std::path::PathBuf;

use anyhow::Result;
use log::info;
use structopt::StructOpt;

use raster_util::raster::{crop_to_geo_box_committed, Raster};

#[derive(StructOpt)]
pub struct CropToRefArgs {
    #[structopt(
        parse(from_os_str),
        long,
        help = "Raster to crop, e.g. the reprojected coarse classification"
    )]
    pub input: PathBuf,

    #[structopt(
        parse(from_os_str),
        long,
        help = "Raster whose bounding box selects the territory"
    )]
    pub reference: PathBuf,

    #[structopt(parse(from_os_str), long, help = "Output raster; may equal the input")]
    pub output: PathBuf,
}

/// Crops the input to the reference raster's geo bounding box. The output
/// transform origin is offset to the box's top left corner; pixel size is
/// untouched, so a coarse raster stays coarse.
pub fn crop_to_reference(args: &CropToRefArgs) -> Result<()> {
    let geo_box = Raster::read(&args.reference)?.stats.geo_box();

    info!("cropping {:?} to reference box {:?}", args.input, geo_box);

    let src = Raster::read(&args.input)?;
    crop_to_geo_box_committed::<u16>(src, &geo_box, &args.output)?;

    Ok(())
}

#[cfg(test)]
mod crop_to_ref_test {
    use super::*;
    use gdal::raster::GdalDataType;
    use gdal::spatial_ref::SpatialRef;
    use raster_util::raster::{create_test_raster, get_temp_filename, RasterStats};

    #[test]
    fn test_crop_covers_reference_box() {
        let projection = SpatialRef::from_epsg(32633).unwrap().to_wkt().unwrap();

        // coarse: 6x6 pixels of 50 units
        let coarse_stats = RasterStats {
            origin_x: 0.0,
            origin_y: 300.0,
            pixel_width: 50.0,
            pixel_height: -50.0,
            num_rows: 6,
            num_cols: 6,
            no_data_value: 0.,
            gdal_type: GdalDataType::UInt16,
            projection: projection.clone(),
        };
        let coarse_data: Vec<u16> = (1..=36).collect();

        // reference: fine grid inside coarse pixels (1..4, 1..4), not on
        // the coarse boundary, so the ceiling must over-cover
        let reference_stats = RasterStats {
            origin_x: 70.0,
            origin_y: 230.0,
            pixel_width: 10.0,
            pixel_height: -10.0,
            num_rows: 11,
            num_cols: 11,
            no_data_value: 0.,
            gdal_type: GdalDataType::UInt16,
            projection,
        };

        let args = CropToRefArgs {
            input: create_test_raster("coarse.tif", &coarse_stats, &coarse_data).unwrap(),
            reference: create_test_raster("reference.tif", &reference_stats, &[0u16; 121])
                .unwrap(),
            output: get_temp_filename("coarse_selected.tif"),
        };

        crop_to_reference(&args).unwrap();

        // reference box x 70..180, y 120..230 -> coarse pixels 1..=3 both axes
        let out = Raster::read(&args.output).unwrap();
        assert_eq!(out.stats.num_cols, 3);
        assert_eq!(out.stats.num_rows, 3);
        assert_eq!(out.stats.origin_x, 50.0);
        assert_eq!(out.stats.origin_y, 250.0);
        assert_eq!(out.stats.pixel_width, 50.0);

        let window = out
            .band()
            .unwrap()
            .read_as::<u16>((0, 0), (3, 3), (3, 3), None)
            .unwrap();
        assert_eq!(window.data, vec![8, 9, 10, 14, 15, 16, 20, 21, 22]);
    }

    #[test]
    fn test_disjoint_reference_is_refused() {
        let projection = SpatialRef::from_epsg(32633).unwrap().to_wkt().unwrap();

        let coarse_stats = RasterStats {
            origin_x: 0.0,
            origin_y: 300.0,
            pixel_width: 50.0,
            pixel_height: -50.0,
            num_rows: 6,
            num_cols: 6,
            no_data_value: 0.,
            gdal_type: GdalDataType::UInt16,
            projection: projection.clone(),
        };

        // reference box x 400..440, entirely east of the coarse raster
        let reference_stats = RasterStats {
            origin_x: 400.0,
            origin_y: 300.0,
            pixel_width: 10.0,
            pixel_height: -10.0,
            num_rows: 4,
            num_cols: 4,
            no_data_value: 0.,
            gdal_type: GdalDataType::UInt16,
            projection,
        };

        let args = CropToRefArgs {
            input: create_test_raster("coarse_west.tif", &coarse_stats, &[1u16; 36]).unwrap(),
            reference: create_test_raster("reference_east.tif", &reference_stats, &[0u16; 16])
                .unwrap(),
            output: get_temp_filename("never_written.tif"),
        };

        assert!(crop_to_reference(&args).is_err());
        assert!(!args.output.exists());
    }
}
