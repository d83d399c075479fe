use crate::math::constants::EARTH_RADIUS_M;
use geo::{geometry::Coord, CoordFloat};
use num_traits::FromPrimitive;

/// Returns the great-circle distance, in meters, between two
/// coordinates given in degrees.
pub fn haversine_distance<T>(a: Coord<T>, b: Coord<T>) -> T
where
    T: CoordFloat + FromPrimitive,
{
    let two = T::one() + T::one();
    let radius = T::from_f64(EARTH_RADIUS_M).unwrap_or_else(T::one);

    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();

    let h = (d_lat / two).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / two).sin().powi(2);
    // Rounding can push `h` a hair past 1 for antipodal points.
    let h = h.min(T::one());
    two * radius * h.sqrt().asin()
}
