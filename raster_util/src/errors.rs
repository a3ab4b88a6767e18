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
use thiserror::Error;

/// Failure kinds for the pipeline stages.
///
/// `Gdal` and `Io` are both fatal I/O failures; a stage hitting one must
/// abort before its destructive rename so the last good artifact survives.
/// `Parse` happens while reading the legend, before any raster is touched.
/// `Geometry` signals an upstream data problem (e.g. an empty mask), not a
/// condition to recover from.
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("raster access failed: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("legend line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("bad geometry: {0}")]
    Geometry(String),
}

pub type Result<T> = std::result::Result<T, GeoError>;
