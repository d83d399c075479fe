use crate::{
    distance::{round_cm, DistanceAccumulator},
    raster_line::{RasterLine, SampleInterval},
    DistanceMetric, MetadataCache, MetadataSource, ProfileError, ValueSource,
};
use geo::geometry::Coord;
use log::{debug, warn};
use std::{sync::Arc, time::Instant};

/// Longest full-resolution pixel path a profile will walk by default.
pub const DEFAULT_MAX_PATH_LEN: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePoint {
    /// Ground distance from the first point, in meters, rounded to
    /// the centimeter.
    pub distance_m: f64,

    /// Raster value at `coord`, or `None` where there's no data.
    pub elevation: Option<f64>,

    /// Geographic location of the sampled pixel.
    pub coord: Coord<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSummary {
    pub total_points: usize,
    pub sampling_interval: usize,
    /// Equal to the last point's `distance_m`.
    pub total_distance_m: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Samples ordered from start to end.
    pub points: Vec<ProfilePoint>,
    pub summary: ProfileSummary,
}

/// Builds value profiles along straight lines across raster datasets.
pub struct Profiler<M, V> {
    metadata: M,
    values: V,
    cache: Arc<MetadataCache>,
    default_dataset: Option<String>,
    metric: DistanceMetric,
    max_path_len: usize,
}

impl<M, V> Profiler<M, V>
where
    M: MetadataSource,
    V: ValueSource,
{
    pub fn builder() -> ProfilerBuilder<M, V> {
        ProfilerBuilder {
            metadata: None,
            values: None,
            cache: None,
            default_dataset: None,
            metric: DistanceMetric::default(),
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }

    /// Returns the profile from `start` to `end` over `dataset`, or
    /// over the default dataset when `dataset` is `None`.
    ///
    /// Every `interval`-th pixel of the rasterized line is sampled,
    /// starting with the pixel containing `start`.
    pub fn compute(
        &self,
        dataset: Option<&str>,
        start: Coord<f64>,
        end: Coord<f64>,
        interval: i64,
    ) -> Result<Profile, ProfileError> {
        let interval = SampleInterval::new(interval)?;
        check_finite(start)?;
        check_finite(end)?;
        let dataset = dataset
            .or(self.default_dataset.as_deref())
            .ok_or_else(|| ProfileError::Input("no dataset given and no default set".into()))?;

        let transform = self.cache.get_or_fetch(dataset, &self.metadata)?;

        let (path, path_runtime) = {
            let now = Instant::now();
            let line = RasterLine::new(transform.to_pixel(start)?, transform.to_pixel(end)?);
            if line.len() > self.max_path_len {
                return Err(ProfileError::Input(format!(
                    "path crosses {} pixels, limit is {}",
                    line.len(),
                    self.max_path_len
                )));
            }
            let path: Vec<Coord<f64>> = line
                .step_by(interval.get())
                .map(|pixel| transform.to_geo(pixel))
                .collect();
            (path, now.elapsed())
        };

        let (values, lookup_runtime) = {
            let now = Instant::now();
            let values = match self.values.values(dataset, &path) {
                Ok(values) => values,
                Err(e) => {
                    warn!("{dataset}: {e}, reporting no data for {} points", path.len());
                    vec![None; path.len()]
                }
            };
            (values, now.elapsed())
        };

        if values.len() != path.len() {
            return Err(ProfileError::Internal(format!(
                "{dataset}: requested {} values, got {}",
                path.len(),
                values.len()
            )));
        }

        let mut distance = DistanceAccumulator::new(self.metric);
        let points: Vec<ProfilePoint> = path
            .into_iter()
            .zip(values)
            .map(|(coord, elevation)| ProfilePoint {
                distance_m: round_cm(distance.push(coord)),
                elevation: elevation.filter(|value| value.is_finite()),
                coord,
            })
            .collect();

        let summary = ProfileSummary {
            total_points: points.len(),
            sampling_interval: interval.get(),
            total_distance_m: round_cm(distance.total_m()),
        };

        debug!(
            "profile; dataset: {dataset}, len: {}, path_exec: {:?}, lookup_exec: {:?}",
            summary.total_points, path_runtime, lookup_runtime
        );

        Ok(Profile { points, summary })
    }

    pub fn default_dataset(&self) -> Option<&str> {
        self.default_dataset.as_deref()
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }
}

pub struct ProfilerBuilder<M, V> {
    metadata: Option<M>,

    values: Option<V>,

    /// Transform cache, possibly shared with other profilers.
    cache: Option<Arc<MetadataCache>>,

    /// Dataset used when a request doesn't name one.
    default_dataset: Option<String>,

    metric: DistanceMetric,

    /// Longest full-resolution path, in pixels, a request may walk.
    max_path_len: usize,
}

impl<M, V> ProfilerBuilder<M, V>
where
    M: MetadataSource,
    V: ValueSource,
{
    pub fn metadata(mut self, source: M) -> Self {
        self.metadata = Some(source);
        self
    }

    pub fn values(mut self, source: V) -> Self {
        self.values = Some(source);
        self
    }

    pub fn cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn default_dataset<S: Into<String>>(mut self, dataset: S) -> Self {
        self.default_dataset = Some(dataset.into());
        self
    }

    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn max_path_len(mut self, pixels: usize) -> Self {
        self.max_path_len = pixels;
        self
    }

    pub fn build(self) -> Result<Profiler<M, V>, ProfileError> {
        if let (Some(metadata), Some(values)) = (self.metadata, self.values) {
            Ok(Profiler {
                metadata,
                values,
                cache: self.cache.unwrap_or_default(),
                default_dataset: self.default_dataset,
                metric: self.metric,
                max_path_len: self.max_path_len,
            })
        } else {
            Err(ProfileError::Builder)
        }
    }
}

/// Returns a coordinate from a `[lon, lat]` slice.
pub fn lon_lat(values: &[f64]) -> Result<Coord<f64>, ProfileError> {
    match *values {
        [x, y] => Ok(Coord { x, y }),
        _ => Err(ProfileError::Input(format!(
            "expected [lon, lat], got {} values",
            values.len()
        ))),
    }
}

fn check_finite(coord: Coord<f64>) -> Result<(), ProfileError> {
    if coord.x.is_finite() && coord.y.is_finite() {
        Ok(())
    } else {
        Err(ProfileError::Input(format!(
            "non-finite coordinate ({}, {})",
            coord.x, coord.y
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{lon_lat, Profiler};
    use crate::{
        DistanceMetric, GeoTransform, MetadataCache, MetadataSource, ProfileError, SampleError,
        ValueSource,
    };
    use approx::assert_relative_eq;
    use geo::{coord, geometry::Coord};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[derive(Clone, Copy)]
    enum Behavior {
        Normal,
        Fail,
        Short,
    }

    /// In-memory raster whose value at pixel (x, y) is `10 * x + y`.
    struct Grid {
        transform: GeoTransform,
        width: i64,
        height: i64,
        behavior: Behavior,
        metadata_calls: AtomicUsize,
        value_calls: AtomicUsize,
    }

    impl Grid {
        fn new(transform: [f64; 6], behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                transform: GeoTransform::from_gdal(transform),
                width: 100,
                height: 100,
                behavior,
                metadata_calls: AtomicUsize::new(0),
                value_calls: AtomicUsize::new(0),
            })
        }

        /// One-degree pixels with the origin at (0, 0).
        fn unit(behavior: Behavior) -> Arc<Self> {
            Self::new([0.0, 1.0, 0.0, 0.0, 0.0, -1.0], behavior)
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.metadata_calls.load(Ordering::SeqCst),
                self.value_calls.load(Ordering::SeqCst),
            )
        }
    }

    impl MetadataSource for Grid {
        fn transform(&self, dataset: &str) -> Result<GeoTransform, ProfileError> {
            self.metadata_calls.fetch_add(1, Ordering::SeqCst);
            match dataset {
                "grid" => Ok(self.transform),
                other => Err(ProfileError::DatasetNotFound(other.to_owned())),
            }
        }
    }

    impl ValueSource for Grid {
        fn values(
            &self,
            _dataset: &str,
            coords: &[Coord<f64>],
        ) -> Result<Vec<Option<f64>>, SampleError> {
            self.value_calls.fetch_add(1, Ordering::SeqCst);
            let lookup = |coord: &Coord<f64>| {
                let px = self.transform.to_pixel(*coord).ok()?;
                #[allow(clippy::cast_precision_loss)]
                ((0..self.width).contains(&px.x) && (0..self.height).contains(&px.y))
                    .then(|| (10 * px.x + px.y) as f64)
            };
            match self.behavior {
                Behavior::Normal => Ok(coords.iter().map(lookup).collect()),
                Behavior::Fail => Err(SampleError("backend down".into())),
                Behavior::Short => Ok(coords.iter().skip(1).map(lookup).collect()),
            }
        }
    }

    fn profiler(grid: &Arc<Grid>) -> Profiler<Arc<Grid>, Arc<Grid>> {
        Profiler::builder()
            .metadata(Arc::clone(grid))
            .values(Arc::clone(grid))
            .default_dataset("grid")
            .build()
            .unwrap()
    }

    #[test]
    fn test_straight_east() {
        let grid = Grid::unit(Behavior::Normal);
        let profile = profiler(&grid)
            .compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 3.0, y: 0.0), 1)
            .unwrap();

        let coords: Vec<Coord<f64>> = profile.points.iter().map(|p| p.coord).collect();
        assert_eq!(
            coords,
            vec![
                coord!(x: 0.0, y: 0.0),
                coord!(x: 1.0, y: 0.0),
                coord!(x: 2.0, y: 0.0),
                coord!(x: 3.0, y: 0.0),
            ]
        );
        let elevations: Vec<Option<f64>> = profile.points.iter().map(|p| p.elevation).collect();
        assert_eq!(elevations, vec![Some(0.0), Some(10.0), Some(20.0), Some(30.0)]);

        assert_eq!(profile.points[0].distance_m, 0.0);
        assert!(profile
            .points
            .windows(2)
            .all(|w| w[0].distance_m < w[1].distance_m));
        assert_relative_eq!(profile.points[1].distance_m, 111_194.93, epsilon = 0.01);

        assert_eq!(profile.summary.total_points, 4);
        assert_eq!(profile.summary.sampling_interval, 1);
        assert_eq!(
            profile.summary.total_distance_m,
            profile.points[3].distance_m
        );
        assert_eq!(grid.calls(), (1, 1));
    }

    #[test]
    fn test_sampling_interval() {
        let grid = Grid::unit(Behavior::Normal);
        let profile = profiler(&grid)
            .compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 6.0, y: -3.0), 2)
            .unwrap();
        // 7 pixels on the full path, positions 0, 2, 4 and 6 are kept.
        assert_eq!(profile.summary.total_points, 4);
        assert_eq!(profile.summary.sampling_interval, 2);
        assert_eq!(profile.points[0].coord, coord!(x: 0.0, y: 0.0));
        assert_eq!(profile.points[3].coord, coord!(x: 6.0, y: -3.0));
        assert!(profile
            .points
            .windows(2)
            .all(|w| w[0].distance_m <= w[1].distance_m));
    }

    #[test]
    fn test_invalid_interval_makes_no_calls() {
        let grid = Grid::unit(Behavior::Normal);
        let profiler = profiler(&grid);
        for interval in [0, -1, i64::MIN] {
            let res = profiler.compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 3.0, y: 0.0), interval);
            assert!(matches!(res, Err(ProfileError::Input(_))));
        }
        assert_eq!(grid.calls(), (0, 0));
    }

    #[test]
    fn test_non_finite_input() {
        let grid = Grid::unit(Behavior::Normal);
        let res = profiler(&grid).compute(
            None,
            coord!(x: f64::NAN, y: 0.0),
            coord!(x: 3.0, y: 0.0),
            1,
        );
        assert!(matches!(res, Err(ProfileError::Input(_))));
        assert_eq!(grid.calls(), (0, 0));
    }

    #[test]
    fn test_short_lookup_is_internal_error() {
        let grid = Grid::unit(Behavior::Short);
        let res = profiler(&grid).compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 3.0, y: 0.0), 1);
        assert!(matches!(res, Err(ProfileError::Internal(_))));
    }

    #[test]
    fn test_failed_lookup_is_no_data() {
        let grid = Grid::unit(Behavior::Fail);
        let profile = profiler(&grid)
            .compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 3.0, y: 0.0), 1)
            .unwrap();
        assert_eq!(profile.points.len(), 4);
        assert!(profile.points.iter().all(|p| p.elevation.is_none()));
        assert!(profile.summary.total_distance_m > 0.0);
    }

    #[test]
    fn test_points_outside_raster_are_no_data() {
        let grid = Grid::unit(Behavior::Normal);
        let profile = profiler(&grid)
            .compute(None, coord!(x: -2.0, y: 0.0), coord!(x: 1.0, y: 0.0), 1)
            .unwrap();
        let elevations: Vec<Option<f64>> = profile.points.iter().map(|p| p.elevation).collect();
        assert_eq!(elevations, vec![None, None, Some(0.0), Some(10.0)]);
    }

    #[test]
    fn test_missing_dataset_is_fatal() {
        let grid = Grid::unit(Behavior::Normal);
        let res = profiler(&grid).compute(
            Some("elsewhere"),
            coord!(x: 0.0, y: 0.0),
            coord!(x: 3.0, y: 0.0),
            1,
        );
        assert!(matches!(res, Err(ProfileError::DatasetNotFound(name)) if name == "elsewhere"));
        assert_eq!(grid.calls(), (1, 0));
    }

    #[test]
    fn test_zero_pixel_size_is_metadata_error() {
        let grid = Grid::new([0.0, 0.0, 0.0, 0.0, 0.0, -1.0], Behavior::Normal);
        let res = profiler(&grid).compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 3.0, y: 0.0), 1);
        assert!(matches!(res, Err(ProfileError::Metadata { .. })));
        assert_eq!(grid.calls(), (1, 0));
    }

    #[test]
    fn test_no_dataset() {
        let grid = Grid::unit(Behavior::Normal);
        let profiler = Profiler::builder()
            .metadata(Arc::clone(&grid))
            .values(Arc::clone(&grid))
            .build()
            .unwrap();
        assert_eq!(profiler.default_dataset(), None);
        let res = profiler.compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 3.0, y: 0.0), 1);
        assert!(matches!(res, Err(ProfileError::Input(_))));
        assert!(profiler
            .compute(Some("grid"), coord!(x: 0.0, y: 0.0), coord!(x: 3.0, y: 0.0), 1)
            .is_ok());
    }

    #[test]
    fn test_max_path_len() {
        let grid = Grid::new([0.0, 0.001, 0.0, 0.0, 0.0, -0.001], Behavior::Normal);
        let profiler = Profiler::builder()
            .metadata(Arc::clone(&grid))
            .values(Arc::clone(&grid))
            .default_dataset("grid")
            .max_path_len(500)
            .build()
            .unwrap();
        let res = profiler.compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 1.0, y: 0.0), 100);
        assert!(matches!(res, Err(ProfileError::Input(_))));
        assert_eq!(grid.calls(), (1, 0));
    }

    #[test]
    fn test_shared_cache() {
        let grid = Grid::unit(Behavior::Normal);
        let cache = Arc::new(MetadataCache::new());
        let build = || {
            Profiler::builder()
                .metadata(Arc::clone(&grid))
                .values(Arc::clone(&grid))
                .cache(Arc::clone(&cache))
                .default_dataset("grid")
                .metric(DistanceMetric::Planar)
                .build()
                .unwrap()
        };
        let (a, b) = (build(), build());
        let pa = a
            .compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 2.0, y: 0.0), 1)
            .unwrap();
        let pb = b
            .compute(None, coord!(x: 0.0, y: 0.0), coord!(x: 2.0, y: 0.0), 1)
            .unwrap();
        assert_eq!(pa, pb);
        assert_eq!(pa.summary.total_distance_m, 222_640.0);
        assert_eq!(grid.calls(), (1, 2));
        assert!(Arc::ptr_eq(a.cache(), &cache));
    }

    #[test]
    fn test_missing_sources() {
        let res = Profiler::<Arc<Grid>, Arc<Grid>>::builder()
            .values(Grid::unit(Behavior::Normal))
            .build();
        assert!(matches!(res, Err(ProfileError::Builder)));
    }

    #[test]
    fn test_lon_lat() {
        assert_eq!(lon_lat(&[1.5, -2.0]).unwrap(), coord!(x: 1.5, y: -2.0));
        assert!(matches!(lon_lat(&[1.5]), Err(ProfileError::Input(_))));
        assert!(matches!(lon_lat(&[1.0, 2.0, 3.0]), Err(ProfileError::Input(_))));
    }
}
