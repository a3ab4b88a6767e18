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

use gdal::raster::{Buffer, GdalType};
use uuid::Uuid;

use crate::errors::Result;
use crate::raster::{create_empty_raster, RasterStats};

pub fn get_temp_filename(file_name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}", Uuid::new_v4(), file_name))
}

pub fn create_test_raster<T: Copy + GdalType>(
    file_name: &str,
    stats: &RasterStats,
    data: &[T],
) -> Result<PathBuf> {
    let path = get_temp_filename(file_name);
    create_test_raster_with_path(&path, stats, data)?;
    Ok(path)
}

pub fn create_test_raster_with_path<T: Copy + GdalType>(
    path: &Path,
    stats: &RasterStats,
    data: &[T],
) -> Result<()> {
    assert!(!path.exists());
    assert_eq!(data.len(), (stats.num_cols * stats.num_rows) as usize);

    let ds = create_empty_raster::<T>(path, stats, false)?;

    let size = (stats.num_cols as usize, stats.num_rows as usize);
    ds.rasterband(1)?
        .write((0, 0), size, &mut Buffer::new(size, data.to_vec()))?;

    Ok(())
}
