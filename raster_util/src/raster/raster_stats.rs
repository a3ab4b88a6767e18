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
use core::fmt;

use float_cmp::approx_eq;
use gdal::raster::{GdalDataType, RasterBand};
use gdal::Dataset;

use crate::coords::{AffineTransform, GeoBox, GeoCoordinate, PixelPoint};
use crate::errors::Result;

// In projected meters this is microscopic, in lat/lon it is under a meter
pub const ALIGN_EPSILON: f64 = 1e-6;

/// Helper struct holding the stats of a raster
#[derive(Debug, Clone)]
pub struct RasterStats {
    pub origin_y: f64,
    pub origin_x: f64,
    pub pixel_height: f64,
    pub pixel_width: f64,
    pub num_rows: u32,
    pub num_cols: u32,
    pub no_data_value: f64,
    pub gdal_type: GdalDataType,

    //WKT projection string
    pub projection: String,
}

impl fmt::Display for RasterStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Origin X,Y: {}, {}\nRight/Bottom: {},{}\nPixel Width/Height: {},{}\nRows: {} Cols: {}\nNo data value: {}\nGdal Type: {:?}\nProjection: {}",
            self.origin_x,
            self.origin_y,
            self.right_x_coord(),
            self.bottom_y_coord(),
            self.pixel_width,
            self.pixel_height,
            self.num_rows,
            self.num_cols,
            self.no_data_value,
            self.gdal_type,
            &self.projection
        )
    }
}

impl RasterStats {
    pub fn new(dataset: &Dataset, band: &RasterBand) -> Result<Self> {
        let geotransform = dataset.geo_transform()?;

        let pixel_width = geotransform[1];
        let pixel_height = geotransform[5];
        let origin_x = geotransform[0];
        let origin_y = geotransform[3];

        let (num_cols, num_rows) = dataset.raster_size();

        // 0 is the universal background sentinel across the pipeline
        let no_data_value = band.no_data_value().unwrap_or(0.);

        Ok(RasterStats {
            origin_y,
            origin_x,
            pixel_width,
            pixel_height,
            num_cols: num_cols as u32,
            num_rows: num_rows as u32,
            no_data_value,
            gdal_type: band.band_type(),
            projection: dataset.projection(),
        })
    }

    pub fn transform(&self) -> AffineTransform {
        AffineTransform::new(
            GeoCoordinate {
                x: self.origin_x,
                y: self.origin_y,
            },
            self.pixel_width,
            self.pixel_height,
        )
    }

    /// Calculates the projected x coordinate of a column's left side
    pub fn calc_x_coord(&self, raster_x: i32) -> f64 {
        self.origin_x + self.pixel_width * raster_x as f64
    }

    pub fn right_x_coord(&self) -> f64 {
        self.calc_x_coord(self.num_cols as i32)
    }

    /// Calculates the projected y coordinate of a row's top side.
    /// Note pixel height is negative
    pub fn calc_y_coord(&self, raster_y: i32) -> f64 {
        self.origin_y + self.pixel_height * raster_y as f64
    }

    pub fn bottom_y_coord(&self) -> f64 {
        self.calc_y_coord(self.num_rows as i32)
    }

    /// Geo extent of the whole raster, from size x transform.
    pub fn geo_box(&self) -> GeoBox {
        GeoBox::new(
            GeoCoordinate {
                x: self.origin_x,
                y: self.origin_y,
            },
            GeoCoordinate {
                x: self.right_x_coord(),
                y: self.bottom_y_coord(),
            },
        )
    }

    pub fn contains_pixel(&self, p: PixelPoint) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.num_cols && (p.y as u32) < self.num_rows
    }

    /// Same projection, same pixel size, origins offset by a whole number
    /// of pixels.
    pub fn is_aligned(&self, rhs: &Self) -> bool {
        if self.projection != rhs.projection {
            return false;
        }

        if !approx_eq!(f64, self.pixel_width, rhs.pixel_width, epsilon = ALIGN_EPSILON)
            || !approx_eq!(f64, self.pixel_height, rhs.pixel_height, epsilon = ALIGN_EPSILON)
        {
            return false;
        }

        let ox_diff = (self.origin_x - rhs.origin_x) / self.pixel_width;
        let oy_diff = (self.origin_y - rhs.origin_y) / self.pixel_height;

        approx_eq!(f64, ox_diff.round(), ox_diff, epsilon = ALIGN_EPSILON)
            && approx_eq!(f64, oy_diff.round(), oy_diff, epsilon = ALIGN_EPSILON)
    }

    pub fn is_nodata(&self, value: f64) -> bool {
        value == self.no_data_value
    }
}
