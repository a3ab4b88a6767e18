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
use crate::errors::{GeoError, Result};

/// Column/row position in a raster's own pixel grid.
/// Origin is the top left corner, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Position in a raster's projected coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub x: f64,
    pub y: f64,
}

/// Per-raster pixel <-> geo mapping.
///
/// Only origin + pixel scale is modeled; rotation/shear terms of the GDAL
/// geo transform are assumed zero, which holds for all rasters this
/// pipeline consumes. Pixel height is negative when rows grow southward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub origin: GeoCoordinate,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

/// Axis aligned rectangle in pixel space, min/max both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

/// Axis aligned rectangle in geo space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBox {
    pub min: GeoCoordinate,
    pub max: GeoCoordinate,
}

impl AffineTransform {
    pub fn new(origin: GeoCoordinate, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin,
            pixel_width,
            pixel_height,
        }
    }

    fn check_pixel_size(&self) -> Result<()> {
        if self.pixel_width == 0.0 || self.pixel_height == 0.0 {
            return Err(GeoError::Geometry(format!(
                "malformed transform, pixel size {}x{}",
                self.pixel_width, self.pixel_height
            )));
        }
        Ok(())
    }

    /// Geo coordinate -> containing pixel, truncating toward the grid origin.
    pub fn to_pixel(&self, geo: GeoCoordinate) -> Result<PixelPoint> {
        self.check_pixel_size()?;

        Ok(PixelPoint {
            x: ((geo.x - self.origin.x) / self.pixel_width).floor() as i32,
            y: ((geo.y - self.origin.y) / self.pixel_height).floor() as i32,
        })
    }

    /// Pixel -> geo coordinate of the pixel's top left corner. Exact, this
    /// is the forward direction of the affine map.
    pub fn to_geo(&self, pixel: PixelPoint) -> GeoCoordinate {
        GeoCoordinate {
            x: self.origin.x + self.pixel_width * pixel.x as f64,
            y: self.origin.y + self.pixel_height * pixel.y as f64,
        }
    }

    /// Geo extent of a single pixel.
    pub fn pixel_geo_box(&self, pixel: PixelPoint) -> GeoBox {
        let a = self.to_geo(pixel);
        let b = self.to_geo(PixelPoint {
            x: pixel.x + 1,
            y: pixel.y + 1,
        });
        GeoBox::new(a, b)
    }

    /// Geo extent covered by an (inclusive) pixel box.
    pub fn pixel_box_to_geo(&self, pixel_box: &PixelBox) -> GeoBox {
        let a = self.to_geo(pixel_box.min);
        let b = self.to_geo(PixelPoint {
            x: pixel_box.max.x + 1,
            y: pixel_box.max.y + 1,
        });
        GeoBox::new(a, b)
    }

    /// Number of pixels needed to fully cover `geo_box`.
    ///
    /// Rounds away from zero; under-covering would silently drop edge
    /// pixels when the box does not fall on the pixel grid.
    pub fn box_size_in_pixels(&self, geo_box: &GeoBox) -> Result<(u32, u32)> {
        self.check_pixel_size()?;

        let width = ((geo_box.max.x - geo_box.min.x).abs() / self.pixel_width.abs()).ceil();
        let height = ((geo_box.max.y - geo_box.min.y).abs() / self.pixel_height.abs()).ceil();

        Ok((width as u32, height as u32))
    }
}

impl PixelBox {
    pub fn new(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            min: PixelPoint {
                x: a.x.min(b.x),
                y: a.y.min(b.y),
            },
            max: PixelPoint {
                x: a.x.max(b.x),
                y: a.y.max(b.y),
            },
        }
    }

    pub fn width(&self) -> u32 {
        (self.max.x - self.min.x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max.y - self.min.y + 1) as u32
    }
}

impl GeoBox {
    pub fn new(a: GeoCoordinate, b: GeoCoordinate) -> Self {
        Self {
            min: GeoCoordinate {
                x: a.x.min(b.x),
                y: a.y.min(b.y),
            },
            max: GeoCoordinate {
                x: a.x.max(b.x),
                y: a.y.max(b.y),
            },
        }
    }

    /// Top left corner as pixel space sees it (min x, max y since the
    /// y axis points down in pixel space).
    pub fn top_left(&self) -> GeoCoordinate {
        GeoCoordinate {
            x: self.min.x,
            y: self.max.y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> AffineTransform {
        AffineTransform::new(
            GeoCoordinate {
                x: 500_000.0,
                y: 6_200_000.0,
            },
            10.0,
            -10.0,
        )
    }

    #[test]
    fn test_round_trip() {
        let t = transform();

        for &(x, y) in &[(0, 0), (1, 0), (0, 1), (17, 23), (10_979, 10_979)] {
            let p = PixelPoint { x, y };
            let geo = t.to_geo(p);
            assert_eq!(t.to_pixel(geo).unwrap(), p);
        }
    }

    #[test]
    fn test_to_pixel_truncates_toward_origin() {
        let t = transform();

        let geo = GeoCoordinate {
            x: 500_009.9,
            y: 6_199_990.1,
        };
        assert_eq!(t.to_pixel(geo).unwrap(), PixelPoint { x: 0, y: 0 });

        let geo = GeoCoordinate {
            x: 500_010.0,
            y: 6_199_990.0,
        };
        assert_eq!(t.to_pixel(geo).unwrap(), PixelPoint { x: 1, y: 1 });
    }

    #[test]
    fn test_zero_pixel_size_is_an_error() {
        let t = AffineTransform::new(GeoCoordinate { x: 0.0, y: 0.0 }, 0.0, -10.0);

        assert!(matches!(
            t.to_pixel(GeoCoordinate { x: 1.0, y: 1.0 }),
            Err(GeoError::Geometry(_))
        ));
    }

    #[test]
    fn test_box_size_one_pixel() {
        let t = transform();

        let one_pixel = t.pixel_geo_box(PixelPoint { x: 4, y: 9 });
        assert_eq!(t.box_size_in_pixels(&one_pixel).unwrap(), (1, 1));
    }

    #[test]
    fn test_box_size_monotonic() {
        let t = transform();
        let origin = GeoCoordinate { x: 0.0, y: 0.0 };

        let mut last = (0, 0);
        for grow in 1..60 {
            let b = GeoBox::new(
                origin,
                GeoCoordinate {
                    x: 3.7 * grow as f64,
                    y: 5.1 * grow as f64,
                },
            );
            let size = t.box_size_in_pixels(&b).unwrap();
            assert!(size.0 >= last.0);
            assert!(size.1 >= last.1);
            last = size;
        }
    }

    #[test]
    fn test_box_size_covers_partial_pixels() {
        let t = transform();

        // 10.1 x 0.2 geo units still needs a 2 x 1 pixel window
        let b = GeoBox::new(
            GeoCoordinate { x: 0.0, y: 0.0 },
            GeoCoordinate { x: 10.1, y: 0.2 },
        );
        assert_eq!(t.box_size_in_pixels(&b).unwrap(), (2, 1));
    }

    #[test]
    fn test_pixel_box_to_geo_normalizes() {
        let t = transform();

        let pb = PixelBox::new(PixelPoint { x: 2, y: 3 }, PixelPoint { x: 4, y: 5 });
        let gb = t.pixel_box_to_geo(&pb);

        assert_eq!(gb.min.x, 500_020.0);
        assert_eq!(gb.max.x, 500_050.0);
        assert_eq!(gb.max.y, 6_199_970.0);
        assert_eq!(gb.min.y, 6_199_940.0);
        assert_eq!(gb.top_left(), t.to_geo(pb.min));
    }
}
