//! HGT tile files as a raster source.

use crate::{GeoTransform, MetadataSource, ProfileError, SampleError, ValueSource};
use dashmap::DashMap;
use geo::geometry::Coord;
use hgt::{HgtError, Tile};
use log::debug;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Serves profiles from `.hgt` tiles, one tile per dataset.
///
/// A dataset identifier is the tile's file path. Relative paths are
/// resolved against the tile directory, when there is one.
pub struct HgtSource {
    /// Directory containing HGT tile files.
    tile_dir: Option<PathBuf>,

    /// How to load tiles (in-memory or mapped).
    tile_mode: TileMode,

    /// Tiles which have been loaded on demand.
    tiles: DashMap<PathBuf, Arc<Tile>>,
}

impl HgtSource {
    pub fn new(tile_mode: TileMode) -> Self {
        Self {
            tile_dir: None,
            tile_mode,
            tiles: DashMap::new(),
        }
    }

    pub fn with_tile_dir(tile_dir: PathBuf, tile_mode: TileMode) -> Result<Self, ProfileError> {
        let unreadable = |e: std::io::Error| ProfileError::DatasetUnreadable {
            dataset: tile_dir.display().to_string(),
            reason: e.to_string(),
        };

        // Let's try to fail early be checking that tile_dir has at
        // least one `hgt` file.
        let mut has_height_files = false;
        for entry in std::fs::read_dir(&tile_dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            let ext = path.extension().and_then(std::ffi::OsStr::to_str);
            if ext.is_some_and(|ext| ext.eq_ignore_ascii_case("hgt")) {
                has_height_files = true;
                break;
            }
        }

        if has_height_files {
            Ok(Self {
                tile_dir: Some(tile_dir),
                tile_mode,
                tiles: DashMap::new(),
            })
        } else {
            Err(ProfileError::DatasetNotFound(format!(
                "{} (no height files)",
                tile_dir.display()
            )))
        }
    }

    /// Returns the tile for `dataset`, loading it on first use.
    pub fn tile(&self, dataset: &str) -> Result<Arc<Tile>, ProfileError> {
        let tile_path = self.resolve(dataset);
        self.tiles
            .entry(tile_path.clone())
            .or_try_insert_with(|| self.load_tile(dataset, &tile_path))
            .map(|r| Arc::clone(&r))
    }
}

/// Private API.
impl HgtSource {
    fn resolve(&self, dataset: &str) -> PathBuf {
        let path = Path::new(dataset);
        let tile_path = match &self.tile_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_owned(),
        };
        if tile_path.exists() {
            return tile_path;
        }
        // Tiles are distributed with both upper and lower case names.
        let lowercase = tile_path
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .map(|name| tile_path.with_file_name(name.to_lowercase()));
        match lowercase {
            Some(lowercase) if lowercase.exists() => lowercase,
            _ => tile_path,
        }
    }

    fn load_tile(&self, dataset: &str, tile_path: &Path) -> Result<Arc<Tile>, ProfileError> {
        debug!("loading {tile_path:?}");
        let tile = match self.tile_mode {
            TileMode::InMem => Tile::load(tile_path),
            TileMode::MemMap => Tile::memmap(tile_path),
        };
        tile.map(Arc::new).map_err(|e| match e {
            HgtError::Io(e) if e.kind() == ErrorKind::NotFound => {
                ProfileError::DatasetNotFound(dataset.to_owned())
            }
            HgtError::Io(e) => ProfileError::DatasetUnreadable {
                dataset: dataset.to_owned(),
                reason: e.to_string(),
            },
            e @ (HgtError::HgtName(_) | HgtError::HgtLen(..)) => ProfileError::Metadata {
                dataset: dataset.to_owned(),
                reason: e.to_string(),
            },
        })
    }
}

impl MetadataSource for HgtSource {
    fn transform(&self, dataset: &str) -> Result<GeoTransform, ProfileError> {
        let tile = self.tile(dataset)?;
        Ok(GeoTransform::from_gdal(tile.geo_transform()))
    }
}

impl ValueSource for HgtSource {
    fn values(&self, dataset: &str, coords: &[Coord<f64>]) -> Result<Vec<Option<f64>>, SampleError> {
        let tile = self.tile(dataset).map_err(|e| SampleError(e.to_string()))?;
        Ok(coords
            .iter()
            .map(|coord| tile.get(*coord).map(f64::from))
            .collect())
    }
}

/// How to handle tile.
///
/// The trade off between loading tile data into memory versus memory
/// mapping is not obvious, and you should measure both before
/// deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMode {
    /// Parse tile and load into memory.
    ///
    /// Note that this can consume gigabytes of RAM when loading many
    /// tiles.
    InMem,

    /// Memory map file contents.
    #[default]
    MemMap,
}
