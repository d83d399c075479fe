use crate::math::{haversine_distance, planar_distance};
use geo::geometry::Coord;
use std::{fmt, str::FromStr};

/// How ground distance between two geographic coordinates is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Great-circle distance on a spherical earth.
    #[default]
    Haversine,

    /// Euclidean distance in degrees times a fixed meters-per-degree.
    ///
    /// Faster, but only reasonable for short spans near the equator.
    Planar,
}

impl DistanceMetric {
    /// Returns the distance, in meters, from `a` to `b`.
    pub fn between(self, a: Coord<f64>, b: Coord<f64>) -> f64 {
        match self {
            Self::Haversine => haversine_distance(a, b),
            Self::Planar => planar_distance(a, b),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "haversine" => Ok(Self::Haversine),
            "planar" => Ok(Self::Planar),
            other => Err(format!(
                "unknown distance metric {other:?}, expected haversine or planar"
            )),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Haversine => f.write_str("haversine"),
            Self::Planar => f.write_str("planar"),
        }
    }
}

/// Running ground distance along a sequence of coordinates.
///
/// The total is kept unrounded; round only what gets reported.
#[derive(Debug, Clone)]
pub struct DistanceAccumulator {
    metric: DistanceMetric,
    previous: Option<Coord<f64>>,
    total_m: f64,
}

impl DistanceAccumulator {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            previous: None,
            total_m: 0.0,
        }
    }

    /// Advances to `coord` and returns the distance covered so far.
    ///
    /// The first coordinate is always at distance 0.
    pub fn push(&mut self, coord: Coord<f64>) -> f64 {
        if let Some(previous) = self.previous.replace(coord) {
            self.total_m += self.metric.between(previous, coord);
        }
        self.total_m
    }

    pub fn total_m(&self) -> f64 {
        self.total_m
    }
}

/// Rounds meters to the nearest centimeter.
pub fn round_cm(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}
