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

use raster_util::raster::{commit_temp_file, reproject_raster, temp_path_for, Raster};

#[derive(StructOpt)]
pub struct ReprojectArgs {
    #[structopt(
        parse(from_os_str),
        long,
        help = "Raster to reproject, e.g. the coarse classification"
    )]
    pub input: PathBuf,

    #[structopt(
        parse(from_os_str),
        long,
        help = "Raster whose projection is the warp target"
    )]
    pub reference: PathBuf,

    #[structopt(parse(from_os_str), long, help = "Output raster; may equal the input")]
    pub output: PathBuf,

    #[structopt(
        long,
        help = "Background value kept transparent in the warped output; defaults to the source nodata (0 when unset)"
    )]
    pub nodata: Option<f64>,
}

/// Warps the input into the reference raster's projection. The warp runs
/// into the temp path; the canonical output only changes on full success.
/// The destination is pre-filled with the background value, so area the
/// warp never touches stays background.
pub fn reproject_to_reference(args: &ReprojectArgs) -> Result<()> {
    let target_projection = Raster::read(&args.reference)?.stats.projection;

    let temp_path = temp_path_for(&args.output);
    {
        let mut src = Raster::read(&args.input)?;
        if let Some(nodata) = args.nodata {
            src.stats.no_data_value = nodata;
        }
        info!(
            "reprojecting {:?} into the projection of {:?}",
            src.path, args.reference
        );
        reproject_raster::<u16>(&src, &temp_path, &target_projection)?;
    }

    commit_temp_file(&temp_path, &args.output)?;
    Ok(())
}

#[cfg(test)]
mod reproject_test {
    use super::*;
    use gdal::raster::GdalDataType;
    use gdal::spatial_ref::SpatialRef;
    use raster_util::raster::{create_test_raster, get_temp_filename, RasterStats};

    #[test]
    fn test_reproject_utm_to_web_mercator() {
        let utm33 = SpatialRef::from_epsg(32633).unwrap().to_wkt().unwrap();
        let web_mercator = SpatialRef::from_epsg(3857).unwrap().to_wkt().unwrap();

        let src_stats = RasterStats {
            origin_x: 500_000.0,
            origin_y: 6_200_000.0,
            pixel_width: 500.0,
            pixel_height: -500.0,
            num_rows: 8,
            num_cols: 8,
            no_data_value: 0.,
            gdal_type: GdalDataType::UInt16,
            projection: utm33,
        };

        let data: Vec<u16> = vec![7u16; 64];

        let reference_stats = RasterStats {
            origin_x: 1_000_000.0,
            origin_y: 8_000_000.0,
            pixel_width: 10.0,
            pixel_height: -10.0,
            num_rows: 2,
            num_cols: 2,
            no_data_value: 0.,
            gdal_type: GdalDataType::UInt16,
            projection: web_mercator.clone(),
        };

        let args = ReprojectArgs {
            input: create_test_raster("modis_sample.tif", &src_stats, &data).unwrap(),
            reference: create_test_raster("sentinel_band.tif", &reference_stats, &[0u16; 4])
                .unwrap(),
            output: get_temp_filename("modis_reprojected.tif"),
            nodata: None,
        };

        reproject_to_reference(&args).unwrap();

        let out = Raster::read(&args.output).unwrap();
        assert_eq!(out.stats.projection, web_mercator);
        assert_eq!(out.stats.num_cols, 8);
        assert_eq!(out.stats.num_rows, 8);
        assert!(out.stats.pixel_width > 0.0);
        assert!(out.stats.pixel_height < 0.0);

        // warped data must land somewhere in the output
        let warped = out
            .band()
            .unwrap()
            .read_as::<u16>((0, 0), (8, 8), (8, 8), None)
            .unwrap();
        assert!(warped.data.iter().any(|&v| v == 7));

        // temp path must not survive a successful commit
        assert!(!temp_path_for(&args.output).exists());
    }
}
