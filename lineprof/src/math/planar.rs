use crate::math::constants::METERS_PER_DEGREE;
use geo::{geometry::Coord, CoordFloat};
use num_traits::FromPrimitive;

/// Returns the Euclidean distance in degree-space, scaled to meters
/// with a constant meters-per-degree factor.
///
/// Only accurate over short spans near the equator, where a degree of
/// longitude and a degree of latitude are about the same length.
pub fn planar_distance<T>(a: Coord<T>, b: Coord<T>) -> T
where
    T: CoordFloat + FromPrimitive,
{
    let scale = T::from_f64(METERS_PER_DEGREE).unwrap_or_else(T::one);
    (b.x - a.x).hypot(b.y - a.y) * scale
}
