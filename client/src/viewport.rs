use hotspot_shared::projection::{mercator_pixel, mercator_unproject};
use hotspot_shared::{GeoPoint, MapProjection, ScreenPoint};

pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 15;
pub const INITIAL_CENTER: GeoPoint = GeoPoint::new(48.3069, 14.2858);
pub const INITIAL_ZOOM: u8 = 8;

/// Slippy-map viewport: integer zoom, pan in global Web Mercator pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Global pixel at the container center, at `zoom`.
    pub center_px: ScreenPoint,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(INITIAL_CENTER, INITIAL_ZOOM, 1200.0, 800.0)
    }
}

impl Viewport {
    pub fn new(center: GeoPoint, zoom: u8, width: f64, height: f64) -> Self {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Self {
            center_px: mercator_pixel(center, zoom as f64),
            zoom,
            width,
            height,
        }
    }

    pub fn center(&self) -> GeoPoint {
        mercator_unproject(self.center_px, self.zoom as f64)
    }

    /// Global pixel at the container's top-left corner.
    pub fn top_left(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.center_px.x - self.width / 2.0,
            self.center_px.y - self.height / 2.0,
        )
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Pan by screen-space delta (content follows the pointer).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center_px.x -= dx;
        self.center_px.y -= dy;
    }

    /// Step the zoom level, keeping the geo point under `(sx, sy)` fixed.
    /// Returns false when already at the zoom limit.
    pub fn zoom_at(&mut self, steps: i32, sx: f64, sy: f64) -> bool {
        let target = (self.zoom as i32 + steps).clamp(MIN_ZOOM as i32, MAX_ZOOM as i32) as u8;
        if target == self.zoom {
            return false;
        }
        let factor = 2f64.powi(target as i32 - self.zoom as i32);
        let top_left = self.top_left();
        let focus_x = (top_left.x + sx) * factor;
        let focus_y = (top_left.y + sy) * factor;
        self.center_px = ScreenPoint::new(
            focus_x - sx + self.width / 2.0,
            focus_y - sy + self.height / 2.0,
        );
        self.zoom = target;
        true
    }

    /// Freeze the current projection as the overlay layer origin.
    pub fn layer_origin(&self) -> LayerOrigin {
        LayerOrigin {
            top_left: self.top_left(),
            zoom: self.zoom,
        }
    }

    /// Transform from layer points laid out at `origin` to current screen
    /// points. Bridges pan/zoom frames until the next settle.
    pub fn layer_transform(&self, origin: &LayerOrigin) -> LayerTransform {
        let scale = 2f64.powi(self.zoom as i32 - origin.zoom as i32);
        let top_left = self.top_left();
        LayerTransform {
            scale,
            dx: origin.top_left.x * scale - top_left.x,
            dy: origin.top_left.y * scale - top_left.y,
        }
    }
}

/// Projection snapshot taken when the viewport settles. Overlay positions
/// are container pixels at that moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOrigin {
    pub top_left: ScreenPoint,
    pub zoom: u8,
}

impl MapProjection for LayerOrigin {
    fn project(&self, point: GeoPoint) -> ScreenPoint {
        let global = mercator_pixel(point, self.zoom as f64);
        ScreenPoint::new(global.x - self.top_left.x, global.y - self.top_left.y)
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
}

impl LayerTransform {
    pub fn apply(&self, p: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(p.x * self.scale + self.dx, p.y * self.scale + self.dy)
    }
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
    fn center_projects_to_container_middle() {
        let vp = Viewport::new(INITIAL_CENTER, 8, 800.0, 600.0);
        let p = vp.layer_origin().project(INITIAL_CENTER);
        assert_close(p.x, 400.0);
        assert_close(p.y, 300.0);
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut vp = Viewport::new(INITIAL_CENTER, 8, 800.0, 600.0);
        let focus = mercator_unproject(
            ScreenPoint::new(vp.top_left().x + 100.0, vp.top_left().y + 50.0),
            8.0,
        );
        assert!(vp.zoom_at(2, 100.0, 50.0));
        assert_eq!(vp.zoom, 10);
        let p = vp.layer_origin().project(focus);
        assert_close(p.x, 100.0);
        assert_close(p.y, 50.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = Viewport::new(INITIAL_CENTER, MAX_ZOOM, 800.0, 600.0);
        assert!(!vp.zoom_at(1, 0.0, 0.0));
        assert_eq!(vp.zoom, MAX_ZOOM);
        assert!(vp.zoom_at(-40, 0.0, 0.0));
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn layer_transform_tracks_pan_since_settle() {
        let mut vp = Viewport::new(INITIAL_CENTER, 8, 800.0, 600.0);
        let origin = vp.layer_origin();
        vp.pan(30.0, -12.0);
        let t = vp.layer_transform(&origin);
        let moved = t.apply(ScreenPoint::new(400.0, 300.0));
        assert_close(moved.x, 430.0);
        assert_close(moved.y, 288.0);
    }

    #[test]
    fn layer_transform_matches_fresh_projection_after_zoom() {
        let mut vp = Viewport::new(INITIAL_CENTER, 8, 800.0, 600.0);
        let origin = vp.layer_origin();
        let geo = GeoPoint::new(48.25, 14.1);
        let laid_out = origin.project(geo);
        vp.zoom_at(1, 220.0, 140.0);
        let bridged = vp.layer_transform(&origin).apply(laid_out);
        let fresh = vp.layer_origin().project(geo);
        assert_close(bridged.x, fresh.x);
        assert_close(bridged.y, fresh.y);
    }
}
