mod options;

use anyhow::Error as AnyError;
use clap::Parser;
use lineprof::{HgtSource, Profile, Profiler, TileMode};
use log::debug;
use options::{Cli, Command as CliCmd};
use serde::Serialize;
use std::{io::Write, sync::Arc};
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let Cli {
        tile_dir,
        dataset,
        interval,
        distance,
        mem_map,
        start,
        dest,
        cmd,
    } = Cli::parse();

    env_logger::init();

    let tile_mode = if mem_map {
        TileMode::MemMap
    } else {
        TileMode::InMem
    };
    let dataset = dataset.unwrap_or_else(|| hgt::file_name(start.0));
    debug!("dataset: {dataset}, start: {:?}, dest: {:?}", start.0, dest.0);

    let tile_src = Arc::new(HgtSource::with_tile_dir(tile_dir, tile_mode)?);
    let profiler = Profiler::builder()
        .metadata(Arc::clone(&tile_src))
        .values(tile_src)
        .default_dataset(dataset)
        .metric(distance)
        .build()?;
    let profile = profiler.compute(None, start.0, dest.0, interval)?;

    match cmd {
        CliCmd::Csv => print_csv(&profile)?,
        CliCmd::Json => print_json(&profile)?,
        CliCmd::Plot => plot_ascii(&profile),
        CliCmd::Summary => print_summary(&profile)?,
    };
    Ok(())
}

/// # Example with gnuplot
///
/// ```sh
/// cargo run -p lineprof-cli -- --tile-dir=data/nasadem/3arcsecond/ --start=44.28,-71.31 --dest=44.25,-71.29 csv | tr ',' ' ' > ~/.tmp/plot && gnuplot -p -e "plot '~/.tmp/plot' using 1:4 with lines"
/// ```
fn print_csv(profile: &Profile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Distance,Longitude,Latitude,Elevation")?;
    for point in &profile.points {
        let distance = point.distance_m;
        let longitude = point.coord.x;
        let latitude = point.coord.y;
        let elevation = point
            .elevation
            .map(|elev| elev.to_string())
            .unwrap_or_default();
        writeln!(stdout, "{distance},{longitude},{latitude},{elevation}")?;
    }
    Ok(())
}

fn print_json(profile: &Profile) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonEntry {
        distance: f64,
        elevation: Option<f64>,
        location: [f64; 2],
    }

    #[derive(Serialize)]
    struct JsonSummary {
        total_points: usize,
        sampling_interval: usize,
        total_distance: f64,
    }

    #[derive(Serialize)]
    struct JsonProfile {
        profile: Vec<JsonEntry>,
        summary: JsonSummary,
    }

    let reshaped = JsonProfile {
        profile: profile
            .points
            .iter()
            .map(|point| JsonEntry {
                distance: point.distance_m,
                elevation: point.elevation,
                location: [point.coord.x, point.coord.y],
            })
            .collect(),
        summary: JsonSummary {
            total_points: profile.summary.total_points,
            sampling_interval: profile.summary.sampling_interval,
            total_distance: profile.summary.total_distance_m,
        },
    };
    let json = serde_json::to_string(&reshaped)?;
    println!("{json}");
    Ok(())
}

fn plot_ascii(profile: &Profile) {
    #[allow(clippy::cast_possible_truncation)]
    let plot_data: Vec<(f32, f32)> = profile
        .points
        .iter()
        .filter_map(|point| Some((point.distance_m as f32, point.elevation? as f32)))
        .collect();
    if plot_data.len() < 2 {
        eprintln!("not enough samples with data to plot");
        return;
    }
    #[allow(clippy::cast_possible_truncation)]
    Chart::new(300, 150, 0.0, profile.summary.total_distance_m as f32)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
}

fn print_summary(profile: &Profile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    let summary = &profile.summary;
    let no_data = profile
        .points
        .iter()
        .filter(|point| point.elevation.is_none())
        .count();
    writeln!(
        stdout,
        "points: {}, interval: {}, distance: {} m, no data: {no_data}",
        summary.total_points, summary.sampling_interval, summary.total_distance_m
    )?;
    Ok(())
}
