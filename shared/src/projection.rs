use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::hotspot::GeoPoint;

pub const TILE_SIZE: f64 = 256.0;
/// Web Mercator is undefined at the poles; latitudes are clamped here.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What the overlay core needs from the map host. Implementations are
/// read-only views of the host's current viewport.
pub trait MapProjection {
    /// Geo coordinate to overlay-layer pixel position.
    fn project(&self, point: GeoPoint) -> ScreenPoint;
    fn zoom(&self) -> u8;
}

/// Global Web Mercator pixel coordinates of `point` at `zoom`.
pub fn mercator_pixel(point: GeoPoint, zoom: f64) -> ScreenPoint {
    let world = TILE_SIZE * 2f64.powf(zoom);
    let lat = point.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.longitude + 180.0) / 360.0 * world;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
    ScreenPoint::new(x, y)
}

/// Inverse of [`mercator_pixel`].
pub fn mercator_unproject(pixel: ScreenPoint, zoom: f64) -> GeoPoint {
    let world = TILE_SIZE * 2f64.powf(zoom);
    let longitude = pixel.x / world * 360.0 - 180.0;
    let n = PI - 2.0 * PI * pixel.y / world;
    let latitude = n.sinh().atan().to_degrees();
    GeoPoint::new(latitude, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-6,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn origin_projects_to_world_center() {
        let p = mercator_pixel(GeoPoint::new(0.0, 0.0), 0.0);
        assert_close(p.x, 128.0);
        assert_close(p.y, 128.0);
    }

    #[test]
    fn world_size_doubles_per_zoom() {
        let p = mercator_pixel(GeoPoint::new(0.0, 180.0), 3.0);
        assert_close(p.x, 2048.0);
    }

    #[test]
    fn unproject_inverts_project() {
        let linz = GeoPoint::new(48.3069, 14.2858);
        let back = mercator_unproject(mercator_pixel(linz, 8.0), 8.0);
        assert_close(back.latitude, linz.latitude);
        assert_close(back.longitude, linz.longitude);
    }

    #[test]
    fn poles_are_clamped() {
        let north = mercator_pixel(GeoPoint::new(90.0, 0.0), 0.0);
        assert!(north.y.is_finite());
        assert_close(north.y, 0.0);
    }
}
