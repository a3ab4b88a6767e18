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
use gdal::raster::Buffer;
use log::info;
use structopt::StructOpt;

use raster_util::legend::{canonicalize_classes, ClassLegend};
use raster_util::raster::{commit_temp_file, create_from_sample, temp_path_for, Raster};

#[derive(StructOpt)]
pub struct RemapClassesArgs {
    #[structopt(parse(from_os_str), long, help = "Classification raster")]
    pub input: PathBuf,

    #[structopt(
        parse(from_os_str),
        long,
        help = "Legend file, one '<code>. <name>' entry per line"
    )]
    pub legend: PathBuf,

    #[structopt(
        long = "class",
        help = "Canonical class names; order sets remap priority"
    )]
    pub classes: Vec<String>,

    #[structopt(parse(from_os_str), long, help = "Output raster; may equal the input")]
    pub output: PathBuf,
}

/// Rewrites aliased class codes to their canonical codes. The legend is
/// parsed before any raster is opened, so a malformed legend aborts the
/// stage with the filesystem untouched.
pub fn remap_classes(args: &RemapClassesArgs) -> Result<()> {
    let legend = ClassLegend::from_file(&args.legend)?;

    let temp_path = temp_path_for(&args.output);
    {
        let src = Raster::read(&args.input)?;
        let size = (src.stats.num_cols as usize, src.stats.num_rows as usize);

        let codes = src.band()?.read_as::<u16>((0, 0), size, size, None)?;
        let remapped = canonicalize_classes(codes.data(), &legend, &args.classes);

        info!(
            "remapping {:?}: {} classes in legend, {} canonical names",
            src.path,
            legend.len(),
            args.classes.len()
        );

        let ds = create_from_sample::<u16>(&temp_path, &src, None, None)?;
        ds.rasterband(1)?
            .write((0, 0), size, &mut Buffer::new(size, remapped))?;
    }

    commit_temp_file(&temp_path, &args.output)?;
    Ok(())
}
