use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand};
use lineprof::{geo::geometry::Coord, DistanceMetric};
use std::{path::PathBuf, str::FromStr};

/// Generate raster value profiles along straight lines.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Directory of elevation tiles.
    #[arg(short, long, env = "LINEPROF_TILE_DIR")]
    pub tile_dir: PathBuf,

    /// Tile to profile, relative to the tile directory.
    ///
    /// Defaults to the tile containing the start point.
    #[arg(short, long, env = "LINEPROF_DATASET")]
    pub dataset: Option<String>,

    /// Keep every N-th pixel along the path.
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub interval: i64,

    /// How ground distance is measured (haversine or planar).
    #[arg(long, default_value_t = DistanceMetric::Haversine)]
    pub distance: DistanceMetric,

    /// Memory map tiles instead of reading them into memory.
    #[arg(long, default_value_t = false)]
    pub mem_map: bool,

    /// Start "lat,lon".
    #[arg(long)]
    pub start: LatLon,

    /// Destination "lat,lon".
    #[arg(long)]
    pub dest: LatLon,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Debug, Copy)]
pub struct LatLon(pub Coord<f64>);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lat,lon pair"))?;
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        Ok(Self(Coord { y: lat, x: lon }))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print profile points to stdout as CSV.
    Csv,

    /// Print profile points and summary to stdout as JSON.
    Json,

    /// Plot elevation to terminal.
    Plot,

    /// Print the profile summary.
    Summary,
}
