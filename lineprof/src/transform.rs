//! Affine georeferencing between raster pixels and geographic
//! coordinates.

use crate::ProfileError;
use geo::geometry::Coord;

/// Pixel indices beyond this magnitude are treated as a request for a
/// point nowhere near the raster.
const MAX_PIXEL_INDEX: f64 = i32::MAX as f64;

/// Six-coefficient affine transform for an axis-aligned raster.
///
/// ```text
/// lon = origin_x + x * pixel_width
/// lat = origin_y + y * pixel_height
/// ```
///
/// The rotation terms are carried so the GDAL coefficient order
/// round-trips, but they are ignored by the conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub origin_y: f64,
    pub rotation_y: f64,
    /// Usually negative for north-up rasters.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Builds a transform from GDAL-ordered coefficients
    /// `[origin_x, pixel_width, rotation_x, origin_y, rotation_y, pixel_height]`.
    pub fn from_gdal(
        [origin_x, pixel_width, rotation_x, origin_y, rotation_y, pixel_height]: [f64; 6],
    ) -> Self {
        Self {
            origin_x,
            pixel_width,
            rotation_x,
            origin_y,
            rotation_y,
            pixel_height,
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.rotation_x,
            self.origin_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Checks that this transform can be used for conversions.
    ///
    /// Returns the reason it can't otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !self.to_gdal().iter().all(|c| c.is_finite()) {
            return Err(format!("non-finite coefficient in {:?}", self.to_gdal()));
        }
        if self.pixel_width == 0.0 || self.pixel_height == 0.0 {
            return Err(format!(
                "zero pixel size ({} x {})",
                self.pixel_width, self.pixel_height
            ));
        }
        Ok(())
    }

    /// Returns the pixel whose center is nearest to `coord`.
    ///
    /// Assumes `self` has passed [`GeoTransform::validate`].
    pub fn to_pixel(&self, coord: Coord<f64>) -> Result<Coord<i64>, ProfileError> {
        let x = ((coord.x - self.origin_x) / self.pixel_width).round();
        let y = ((coord.y - self.origin_y) / self.pixel_height).round();
        if !(x.abs() <= MAX_PIXEL_INDEX && y.abs() <= MAX_PIXEL_INDEX) {
            return Err(ProfileError::Input(format!(
                "coordinate ({}, {}) maps outside the addressable raster",
                coord.x, coord.y
            )));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Coord {
            x: x as i64,
            y: y as i64,
        })
    }

    /// Returns the geographic coordinate of `pixel`.
    pub fn to_geo(&self, pixel: Coord<i64>) -> Coord<f64> {
        #[allow(clippy::cast_precision_loss)]
        Coord {
            x: self.origin_x + pixel.x as f64 * self.pixel_width,
            y: self.origin_y + pixel.y as f64 * self.pixel_height,
        }
    }
}
