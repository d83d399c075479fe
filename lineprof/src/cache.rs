//! Per-dataset memoization of georeferencing transforms.

use crate::{GeoTransform, MetadataSource, ProfileError};
use dashmap::DashMap;
use log::debug;

/// Concurrent dataset → [`GeoTransform`] map.
///
/// Entries are never evicted. That's fine for a small, fixed catalog
/// of datasets, but grows without bound otherwise.
#[derive(Debug, Default)]
pub struct MetadataCache {
    transforms: DashMap<String, GeoTransform>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the transform for `dataset`, retrieving it from `source`
    /// on first use.
    ///
    /// Retrieval happens without holding a lock, so concurrent first
    /// requests for the same dataset may each hit `source`. The
    /// results are identical and the last insert wins. Failures are
    /// not cached.
    pub fn get_or_fetch<M>(&self, dataset: &str, source: &M) -> Result<GeoTransform, ProfileError>
    where
        M: MetadataSource + ?Sized,
    {
        if let Some(transform) = self.get(dataset) {
            return Ok(transform);
        }
        debug!("fetching transform for {dataset}");
        let transform = source.transform(dataset)?;
        transform
            .validate()
            .map_err(|reason| ProfileError::Metadata {
                dataset: dataset.to_owned(),
                reason,
            })?;
        self.transforms.insert(dataset.to_owned(), transform);
        Ok(transform)
    }

    /// Returns the cached transform for `dataset`, if any.
    pub fn get(&self, dataset: &str) -> Option<GeoTransform> {
        self.transforms.get(dataset).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}
