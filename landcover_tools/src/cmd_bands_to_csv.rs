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
use std::time::Instant;

use anyhow::{bail, Result};
use log::info;
use structopt::StructOpt;

use raster_util::raster::Raster;

#[derive(StructOpt)]
pub struct BandsToCsvArgs {
    #[structopt(
        long = "band",
        parse(from_os_str),
        help = "Single band rasters, one CSV column each; the column name is the file stem"
    )]
    pub bands: Vec<PathBuf>,

    #[structopt(parse(from_os_str), long, help = "Path to the CSV table")]
    pub output: PathBuf,
}

/// Exports same-grid single band rasters to one table: one row per pixel
/// in row-major scan order, one column per band.
pub fn bands_to_csv(args: &BandsToCsvArgs) -> Result<()> {
    if args.bands.is_empty() {
        bail!("need at least one --band raster");
    }

    let rasters: Vec<Raster> = args
        .bands
        .iter()
        .map(|p| Raster::read(p))
        .collect::<Result<_, _>>()?;

    let first = &rasters[0];
    for r in &rasters[1..] {
        if r.stats.num_cols != first.stats.num_cols || r.stats.num_rows != first.stats.num_rows {
            bail!("{:?} and {:?} differ in size", first.path, r.path);
        }
        if !r.stats.is_aligned(&first.stats) {
            bail!("{:?} and {:?} are not on the same grid", first.path, r.path);
        }
    }

    let num_cols = first.stats.num_cols as usize;
    let num_rows = first.stats.num_rows as usize;

    let mut writer = csv::Writer::from_path(&args.output)?;

    let header: Vec<String> = args
        .bands
        .iter()
        .map(|p| {
            p.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "band".to_string())
        })
        .collect();
    writer.write_record(&header)?;

    let now = Instant::now();
    let mut last_output = Instant::now();

    let mut row_values: Vec<Vec<u16>> = Vec::with_capacity(rasters.len());
    for row in 0..num_rows {
        row_values.clear();
        for raster in &rasters {
            let buf = raster.band()?.read_as::<u16>(
                (0, row as isize),
                (num_cols, 1),
                (num_cols, 1),
                None,
            )?;
            row_values.push(buf.into_shape_and_vec().1);
        }

        for col in 0..num_cols {
            let record: Vec<String> = row_values.iter().map(|b| b[col].to_string()).collect();
            writer.write_record(&record)?;
        }

        if last_output.elapsed().as_secs() >= 3 {
            last_output = Instant::now();
            info!(
                "through row {} of {} after {:?}",
                row,
                num_rows,
                now.elapsed()
            );
        }
    }

    writer.flush()?;
    Ok(())
}
