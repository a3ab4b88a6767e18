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
use anyhow::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use structopt::StructOpt;

use crate::cmd_bands_to_csv::{bands_to_csv, BandsToCsvArgs};
use crate::cmd_crop_to_mask::{crop_to_mask, CropToMaskArgs};
use crate::cmd_crop_to_ref::{crop_to_reference, CropToRefArgs};
use crate::cmd_remap_classes::{remap_classes, RemapClassesArgs};
use crate::cmd_reproject::{reproject_to_reference, ReprojectArgs};

mod cmd_bands_to_csv;
mod cmd_crop_to_mask;
mod cmd_crop_to_ref;
mod cmd_remap_classes;
mod cmd_reproject;

#[derive(StructOpt)]
struct Cli {
    #[structopt(long, default_value = "Info")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    #[structopt(help = "Warps a raster into the projection of a reference raster")]
    Reproject(ReprojectArgs),

    #[structopt(help = "Crops a mask raster and a data raster to the extent where mask == 1")]
    CropToMask(CropToMaskArgs),

    #[structopt(help = "Crops a raster to the bounding box of a reference raster")]
    CropToRef(CropToRefArgs),

    #[structopt(help = "Collapses aliased class codes onto canonical codes using a legend file")]
    RemapClasses(RemapClassesArgs),

    #[structopt(help = "Exports same-grid single band rasters to one CSV, a column per band")]
    BandsToCsv(BandsToCsvArgs),
}

fn run(args: &Cli) -> Result<()> {
    match &args.cmd {
        Command::Reproject(r) => reproject_to_reference(r),
        Command::CropToMask(r) => crop_to_mask(r),
        Command::CropToRef(r) => crop_to_reference(r),
        Command::RemapClasses(r) => remap_classes(r),
        Command::BandsToCsv(r) => bands_to_csv(r),
    }
}

fn main() {
    let args = Cli::from_args();

    SimpleLogger::new()
        .with_level(args.log_level)
        .init()
        .unwrap();

    run(&args).unwrap();
}
