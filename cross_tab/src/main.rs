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
use std::collections::BTreeMap;
use std::fs::remove_file;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use gdal::raster::GdalDataType;
use itertools::Itertools;
use log::{debug, info, LevelFilter};
use simple_logger::SimpleLogger;
use structopt::StructOpt;

use raster_util::coords::{GeoCoordinate, PixelPoint};
use raster_util::raster::Raster;

/// Produces a CSV with one row per nonzero coarse classification pixel:
/// its pixel and geo coordinates, its class, how many fine resolution
/// pixels of each cluster fall inside its footprint, and the majority
/// cluster.

#[derive(StructOpt)]
struct Cli {
    #[structopt(
        parse(from_os_str),
        long,
        help = "Coarse classification raster, aligned and cropped to the cluster raster"
    )]
    class_raster: PathBuf,

    #[structopt(
        parse(from_os_str),
        long,
        help = "Fine resolution cluster label raster"
    )]
    cluster_raster: PathBuf,

    #[structopt(parse(from_os_str), long, help = "Path to CSV results")]
    stats_csv: PathBuf,

    #[structopt(long)]
    clean: bool,

    #[structopt(long, default_value = "Warn")]
    log_level: LevelFilter,
}

struct AggregationRecord {
    pixel: PixelPoint,
    geo: GeoCoordinate,
    class_code: u16,
    counts: BTreeMap<u16, u64>,
    majority: u16,
}

fn main() {
    let args = Cli::from_args();

    SimpleLogger::new()
        .with_level(args.log_level)
        .init()
        .unwrap();

    run(&args).unwrap();
}

fn run(args: &Cli) -> Result<()> {
    let class_raster = Raster::read(&args.class_raster)?;
    let cluster_raster = Raster::read(&args.cluster_raster)?;

    if class_raster.stats.projection != cluster_raster.stats.projection {
        bail!(
            "{:?} and {:?} are in different projections, reproject first",
            args.class_raster,
            args.cluster_raster
        );
    }

    for raster in [&class_raster, &cluster_raster] {
        match raster.stats.gdal_type {
            GdalDataType::UInt8 | GdalDataType::UInt16 | GdalDataType::UInt32 => {}
            other => bail!(
                "{:?} must be an unsigned integer raster, found {:?}",
                raster.path,
                other
            ),
        }
    }

    if args.clean && args.stats_csv.exists() {
        remove_file(&args.stats_csv)?;
    }

    if args.stats_csv.exists() {
        println!("{:?} already exists, nothing to do", &args.stats_csv);
        return Ok(());
    }

    let records = aggregate(&class_raster, &cluster_raster)?;

    // column universe: every cluster id observed anywhere in this run
    let all_ids: Vec<u16> = records
        .iter()
        .flat_map(|r| r.counts.keys().copied())
        .unique()
        .sorted()
        .collect();

    info!(
        "{} coarse pixels with data, {} distinct clusters",
        records.len(),
        all_ids.len()
    );

    let mut writer = csv::Writer::from_path(&args.stats_csv)?;

    let mut header = vec![
        "pixel_x".to_string(),
        "pixel_y".to_string(),
        "geo_x".to_string(),
        "geo_y".to_string(),
        "class".to_string(),
    ];
    header.extend(all_ids.iter().map(|id| format!("count_{}", id)));
    header.push("majority".to_string());
    writer.write_record(&header)?;

    for r in &records {
        let mut record = vec![
            r.pixel.x.to_string(),
            r.pixel.y.to_string(),
            r.geo.x.to_string(),
            r.geo.y.to_string(),
            r.class_code.to_string(),
        ];
        record.extend(
            all_ids
                .iter()
                .map(|id| r.counts.get(id).copied().unwrap_or(0).to_string()),
        );
        record.push(r.majority.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Scans the coarse grid row-major; the returned records keep that order,
/// which fixes the output row order for reproducible diffs.
fn aggregate(class_raster: &Raster, cluster_raster: &Raster) -> Result<Vec<AggregationRecord>> {
    let num_cols = class_raster.stats.num_cols as usize;
    let num_rows = class_raster.stats.num_rows as usize;

    let class_data =
        class_raster
            .band()?
            .read_as::<u16>((0, 0), (num_cols, num_rows), (num_cols, num_rows), None)?;

    let coarse = class_raster.stats.transform();
    let fine = cluster_raster.stats.transform();
    let cluster_band = cluster_raster.band()?;

    let now = Instant::now();
    let mut last_output = Instant::now();

    let mut records = Vec::new();

    for y in 0..num_rows {
        for x in 0..num_cols {
            let class_code = class_data.data()[y * num_cols + x];

            //0 is the universal background sentinel
            if class_code == 0 {
                continue;
            }

            let pixel = PixelPoint {
                x: x as i32,
                y: y as i32,
            };
            let footprint = coarse.pixel_geo_box(pixel);

            let top_left = fine.to_pixel(footprint.top_left())?;
            let (box_cols, box_rows) = fine.box_size_in_pixels(&footprint)?;

            let x0 = top_left.x.max(0);
            let y0 = top_left.y.max(0);
            let x1 = (top_left.x + box_cols as i32).min(cluster_raster.stats.num_cols as i32);
            let y1 = (top_left.y + box_rows as i32).min(cluster_raster.stats.num_rows as i32);

            if x1 <= x0 || y1 <= y0 {
                debug!(
                    "footprint of coarse pixel {},{} is outside the cluster raster",
                    x, y
                );
                continue;
            }

            let window = ((x1 - x0) as usize, (y1 - y0) as usize);
            let labels = cluster_band.read_as::<u16>((x0 as isize, y0 as isize), window, window, None)?;

            let mut counts: BTreeMap<u16, u64> = BTreeMap::new();
            for &label in labels.data() {
                *counts.entry(label).or_insert(0) += 1;
            }

            // strictly greater count wins; walking the map in ascending id
            // order means ties keep the lowest cluster id
            let mut majority = 0u16;
            let mut majority_count = 0u64;
            for (&id, &n) in &counts {
                if n > majority_count {
                    majority = id;
                    majority_count = n;
                }
            }

            records.push(AggregationRecord {
                pixel,
                geo: coarse.to_geo(pixel),
                class_code,
                counts,
                majority,
            });
        }

        if last_output.elapsed().as_secs() >= 3 {
            last_output = Instant::now();
            info!(
                "through row {} of {} after {:?}",
                y,
                num_rows,
                now.elapsed()
            );
        }
    }

    Ok(records)
}
