use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const PINK: Rgb = Rgb(255, 192, 203);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const DARK_RED: Rgb = Rgb(139, 0, 0);

    pub fn css(self) -> String {
        format!("rgb({},{},{})", self.0, self.1, self.2)
    }
}

/// Format RGBA as a CSS color string.
pub fn rgba_css(color: Rgb, a: f64) -> String {
    format!("rgba({},{},{},{a})", color.0, color.1, color.2)
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let value = a as f64 + (b as f64 - a as f64) * t;
    value.round().clamp(0.0, 255.0) as u8
}

/// Two-stop linear scale from a numeric domain onto an RGB range.
/// Inputs outside the domain clamp to the nearest end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearColorScale {
    pub domain: (f64, f64),
    pub range: (Rgb, Rgb),
}

impl LinearColorScale {
    pub fn new(domain: (f64, f64), range: (Rgb, Rgb)) -> Self {
        Self { domain, range }
    }

    /// Position of `value` inside the domain, in [0, 1]. A degenerate domain
    /// maps everything at or above its minimum to the top of the range.
    pub fn normalize(&self, value: f64) -> f64 {
        let (lo, hi) = self.domain;
        let span = hi - lo;
        if !value.is_finite() {
            return 0.0;
        }
        if span.abs() < f64::EPSILON {
            return if value >= lo && hi > 0.0 { 1.0 } else { 0.0 };
        }
        ((value - lo) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        self.color_at(self.normalize(value))
    }

    /// Sample the range directly at `t` in [0, 1].
    pub fn color_at(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let (from, to) = self.range;
        Rgb(
            lerp_u8(from.0, to.0, t),
            lerp_u8(from.1, to.1, t),
            lerp_u8(from.2, to.2, t),
        )
    }
}

/// Pure white reads as "no data", so it is drawn almost transparent.
pub const WHITE_ALPHA: f64 = 0.2;

pub fn fill_alpha(color: Rgb, default_alpha: f64) -> f64 {
    if color == Rgb::WHITE {
        WHITE_ALPHA
    } else {
        default_alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_maps_domain_ends_to_range_ends() {
        let scale = LinearColorScale::new((0.0, 600.0), (Rgb::PINK, Rgb::RED));
        assert_eq!(scale.color(0.0), Rgb::PINK);
        assert_eq!(scale.color(600.0), Rgb::RED);
    }

    #[test]
    fn scale_interpolates_midpoint() {
        let scale = LinearColorScale::new((0.0, 100.0), (Rgb(0, 0, 0), Rgb(200, 100, 50)));
        assert_eq!(scale.color(50.0), Rgb(100, 50, 25));
    }

    #[test]
    fn scale_clamps_outside_domain() {
        let scale = LinearColorScale::new((10.0, 20.0), (Rgb::WHITE, Rgb::DARK_RED));
        assert_eq!(scale.color(-5.0), Rgb::WHITE);
        assert_eq!(scale.color(99.0), Rgb::DARK_RED);
    }

    #[test]
    fn degenerate_domain_does_not_divide_by_zero() {
        let scale = LinearColorScale::new((0.0, 0.0), (Rgb::PINK, Rgb::RED));
        assert_eq!(scale.color(0.0), Rgb::PINK);
        let single = LinearColorScale::new((42.0, 42.0), (Rgb::PINK, Rgb::RED));
        assert_eq!(single.color(42.0), Rgb::RED);
    }

    #[test]
    fn white_is_rendered_translucent() {
        assert_eq!(fill_alpha(Rgb::WHITE, 0.85), WHITE_ALPHA);
        assert_eq!(fill_alpha(Rgb(254, 255, 255), 0.85), 0.85);
    }

    #[test]
    fn css_strings() {
        assert_eq!(Rgb::RED.css(), "rgb(255,0,0)");
        assert_eq!(rgba_css(Rgb::PINK, 0.7), "rgba(255,192,203,0.7)");
    }
}
