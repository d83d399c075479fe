mod haversine;
mod planar;

pub(crate) use {haversine::haversine_distance, planar::planar_distance};

pub(crate) mod constants {
    /// Spherical earth radius used for great-circle distances.
    pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

    /// Length of one degree of arc at the equator.
    pub const METERS_PER_DEGREE: f64 = 111_320.0;
}
