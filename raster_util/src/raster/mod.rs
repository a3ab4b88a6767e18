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
use std::path::{Path, PathBuf};

use gdal::raster::RasterBand;
use gdal::Dataset;

mod algo;
mod raster_stats;
mod test_util;

pub use algo::*;
pub use raster_stats::*;
pub use test_util::*;

use crate::errors::Result;

/// Open raster handle: path + stats + GDAL dataset.
///
/// Borrowed for the duration of one pipeline operation; dropping it closes
/// the dataset, nothing caches handles across stages.
pub struct Raster {
    pub path: PathBuf,
    pub stats: RasterStats,
    pub dataset: Dataset,
}

impl Raster {
    /// Opens read-only and snapshots the stats of band 1.
    pub fn read(path: &Path) -> Result<Raster> {
        let dataset = Dataset::open(path)?;

        let band = dataset.rasterband(1)?;
        let stats = RasterStats::new(&dataset, &band)?;

        Ok(Raster {
            path: path.to_path_buf(),
            stats,
            dataset,
        })
    }

    pub fn band(&self) -> Result<RasterBand> {
        Ok(self.dataset.rasterband(1)?)
    }
}
