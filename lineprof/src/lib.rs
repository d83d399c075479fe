//! Raster value profiles along straight lines.
//!
//! A [`Profiler`] converts the endpoints of a line to raster pixels,
//! walks the pixels in between, and reports the raster value at every
//! N-th pixel along with the ground distance covered so far.

mod cache;
mod distance;
mod error;
mod hgt_source;
mod math;
mod profile;
mod raster_line;
mod source;
mod transform;

pub use crate::{
    cache::MetadataCache,
    distance::{round_cm, DistanceAccumulator, DistanceMetric},
    error::{ProfileError, SampleError},
    hgt_source::{HgtSource, TileMode},
    profile::{
        lon_lat, Profile, ProfilePoint, ProfileSummary, Profiler, ProfilerBuilder,
        DEFAULT_MAX_PATH_LEN,
    },
    raster_line::{RasterLine, SampleInterval},
    source::{MetadataSource, ValueSource},
    transform::GeoTransform,
};
pub use geo;
