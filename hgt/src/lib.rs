//! SRTM/NASADEM elevation (`.hgt`) file format.
//!
//! A tile covers one degree of latitude and longitude. Samples are
//! big-endian `i16` stored row-major, starting at the north-west
//! corner. The outermost rows and columns overlap with neighboring
//! tiles, so a 3 arc-second tile is 1201 samples wide rather than
//! 1200.
//!
//! # References
//!
//! 1. [30-Meter SRTM Tile Downloader](https://dwtkns.com/srtm30m)
//! 1. [Archive Team](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

mod error;

pub use crate::error::HgtError;
use byteorder::{BigEndian as BE, ReadBytesExt};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

/// Base floating point type used for all coordinates.
pub type C = f64;

/// Sample value marking a hole in the source data.
pub const VOID: i16 = i16::MIN;

const ARCSEC_PER_DEG: C = 3600.0;

pub struct Tile {
    /// Southwest corner of the tile, in whole degrees.
    sw_corner: Coord<i16>,

    /// Arcseconds per sample.
    resolution: u8,

    /// Number of samples along each edge of this (square) tile.
    dimension: usize,

    /// Elevation samples.
    samples: SampleStore,
}

enum SampleStore {
    InMem(Box<[i16]>),
    MemMap(Mmap),
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> i16 {
        match self {
            Self::InMem(samples) => samples[index],
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                i16::from_be_bytes([raw[start], raw[start + 1]])
            }
        }
    }
}

impl Tile {
    /// Returns a Tile read into memory from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, HgtError> {
        let (resolution, dimension) = extract_resolution(&path)?;
        let sw_corner = parse_sw_corner(&path)?;

        let mut file = BufReader::new(File::open(path)?);

        let samples = {
            let len = dimension * dimension;
            let mut sample_store = Vec::with_capacity(len);
            for _ in 0..len {
                sample_store.push(file.read_i16::<BE>()?);
            }
            SampleStore::InMem(sample_store.into_boxed_slice())
        };

        Ok(Self {
            sw_corner,
            resolution,
            dimension,
            samples,
        })
    }

    /// Returns a Tile using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, HgtError> {
        let (resolution, dimension) = extract_resolution(&path)?;
        let sw_corner = parse_sw_corner(&path)?;

        let samples = {
            let file = File::open(path)?;
            // Safety: tiles are treated as read-only inputs and are
            // not expected to change while mapped.
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self {
            sw_corner,
            resolution,
            dimension,
            samples,
        })
    }

    /// Returns the southwest corner of this tile in whole degrees.
    pub fn sw_corner(&self) -> Coord<i16> {
        self.sw_corner
    }

    /// Returns this tile's resolution in arcseconds per sample.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Returns the number of samples along each edge.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.dimension * self.dimension
    }

    /// Returns this tile's affine georeferencing transform in GDAL
    /// coefficient order.
    ///
    /// The origin is the _center_ of the north-west sample, so
    /// rounding a fractional pixel index lands on the nearest sample.
    pub fn geo_transform(&self) -> [C; 6] {
        let step = self.step();
        [
            C::from(self.sw_corner.x),
            step,
            0.0,
            C::from(self.sw_corner.y) + 1.0,
            0.0,
            -step,
        ]
    }

    /// Returns the sample nearest to the given geo coordinates.
    ///
    /// Returns `None` when `coord` is outside this tile or the sample
    /// is void.
    pub fn get(&self, coord: Coord<C>) -> Option<i16> {
        let (col, row) = self.coord_to_xy(coord)?;
        match self.get_xy((col, row)) {
            VOID => None,
            elevation => Some(elevation),
        }
    }
}

/// Private API
impl Tile {
    /// Degrees per sample.
    fn step(&self) -> C {
        C::from(self.resolution) / ARCSEC_PER_DEG
    }

    fn get_xy(&self, (col, row): (usize, usize)) -> i16 {
        self.samples.get_unchecked(self.xy_to_linear_index((col, row)))
    }

    fn coord_to_xy(&self, coord: Coord<C>) -> Option<(usize, usize)> {
        let step = self.step();
        let col = ((coord.x - C::from(self.sw_corner.x)) / step).round();
        let row = ((C::from(self.sw_corner.y) + 1.0 - coord.y) / step).round();
        #[allow(clippy::cast_precision_loss)]
        let max = (self.dimension - 1) as C;
        if (0.0..=max).contains(&col) && (0.0..=max).contains(&row) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some((col as usize, row as usize))
        } else {
            None
        }
    }

    fn xy_to_linear_index(&self, (col, row): (usize, usize)) -> usize {
        self.dimension * row + col
    }
}

/// Returns the name of the tile file containing `coord`, e.g.
/// `N44W072.hgt`.
pub fn file_name(coord: Coord<C>) -> String {
    let Coord { x, y } = sw_corner(coord);
    let (n_s, lat) = {
        let lat = y.abs();
        let n_s = if y.is_negative() { 'S' } else { 'N' };
        (n_s, lat)
    };
    let (e_w, lon) = {
        let lon = x.abs();
        let e_w = if x.is_negative() { 'W' } else { 'E' };
        (e_w, lon)
    };
    format!("{n_s}{lat:02}{e_w}{lon:03}.hgt")
}

/// Returns the southwest corner as integers for coord.
fn sw_corner(Coord { x, y }: Coord<C>) -> Coord<i16> {
    #[allow(clippy::cast_possible_truncation)]
    Coord {
        x: (x.floor() as i16),
        y: (y.floor() as i16),
    }
}

fn extract_resolution<P: AsRef<Path>>(path: P) -> Result<(u8, usize), HgtError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<i16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<i16>() as u64;
    match path.as_ref().metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, 3601)),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, 1201)),
        invalid_len => Err(HgtError::HgtLen(invalid_len, path.as_ref().to_owned())),
    }
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, HgtError> {
    let mk_err = || HgtError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}
