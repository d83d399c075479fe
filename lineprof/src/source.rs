//! Raster collaborators consumed by the profiler.

use crate::{GeoTransform, ProfileError, SampleError};
use geo::geometry::Coord;
use std::sync::Arc;

/// Produces the georeferencing transform of a dataset.
pub trait MetadataSource {
    /// Fails with [`ProfileError::DatasetNotFound`],
    /// [`ProfileError::DatasetUnreadable`] or [`ProfileError::Metadata`].
    fn transform(&self, dataset: &str) -> Result<GeoTransform, ProfileError>;
}

/// Looks up raster values at geographic coordinates.
pub trait ValueSource {
    /// Returns one entry per coordinate, in the same order, with `None`
    /// where the dataset has no value.
    ///
    /// An `Err` means the lookup failed as a whole.
    fn values(&self, dataset: &str, coords: &[Coord<f64>]) -> Result<Vec<Option<f64>>, SampleError>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for Arc<T> {
    fn transform(&self, dataset: &str) -> Result<GeoTransform, ProfileError> {
        (**self).transform(dataset)
    }
}

impl<T: ValueSource + ?Sized> ValueSource for Arc<T> {
    fn values(&self, dataset: &str, coords: &[Coord<f64>]) -> Result<Vec<Option<f64>>, SampleError> {
        (**self).values(dataset, coords)
    }
}
