use serde::{Deserialize, Serialize};

use crate::colors::{LinearColorScale, Rgb};

pub const DETAIL_ZOOM_THRESHOLD: u8 = 13;
pub const DETAIL_FADE_MS: f64 = 300.0;
pub const CIRCLE_FILL_ALPHA: f64 = 0.7;
pub const SLICE_ALPHA: f64 = 0.85;

/// Circle radius as a linear function of the integer zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusPolicy {
    pub slope: f64,
    pub intercept: f64,
}

impl RadiusPolicy {
    pub fn radius(&self, zoom: u8) -> f64 {
        (self.slope * zoom as f64 + self.intercept).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColorDomain {
    /// `[0, longest stay in the dataset]`.
    DataMax,
    Fixed { min: f64, max: f64 },
}

impl ColorDomain {
    pub fn resolve(&self, data_max: f64) -> (f64, f64) {
        match *self {
            ColorDomain::DataMax => (0.0, data_max),
            ColorDomain::Fixed { min, max } => (min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieMode {
    /// Slice angle proportional to minutes spent that day.
    DurationWeighted,
    /// One equal slice per day; minutes are encoded by fill color only.
    EqualSlices,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieConfig {
    pub mode: PieMode,
    /// Draw a leader line and date label for every `label_stride`-th slice.
    pub label_stride: usize,
    pub slice_color_range: (Rgb, Rgb),
    pub slice_alpha: f64,
    /// Horizontal push of the date label past the outer arc, as a multiple
    /// of the pie radius.
    pub label_offset: f64,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            mode: PieMode::DurationWeighted,
            label_stride: 1,
            slice_color_range: (Rgb::WHITE, Rgb::DARK_RED),
            slice_alpha: SLICE_ALPHA,
            label_offset: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// `4·zoom + 1`, duration-weighted pie, every slice labelled.
    Classic,
    /// `5·zoom + 1`, one slice per day, every second slice labelled.
    DailyBreakdown,
}

impl Preset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Self::Classic),
            "daily" | "daily_breakdown" | "daily-breakdown" => Some(Self::DailyBreakdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub radius: RadiusPolicy,
    pub color_domain: ColorDomain,
    pub color_range: (Rgb, Rgb),
    pub circle_fill_alpha: f64,
    pub detail_zoom_threshold: u8,
    pub detail_fade_ms: f64,
    pub pie: PieConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::preset(Preset::Classic)
    }
}

impl OverlayConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Classic => Self {
                radius: RadiusPolicy {
                    slope: 4.0,
                    intercept: 1.0,
                },
                color_domain: ColorDomain::DataMax,
                color_range: (Rgb::PINK, Rgb::RED),
                circle_fill_alpha: CIRCLE_FILL_ALPHA,
                detail_zoom_threshold: DETAIL_ZOOM_THRESHOLD,
                detail_fade_ms: DETAIL_FADE_MS,
                pie: PieConfig::default(),
            },
            Preset::DailyBreakdown => Self {
                radius: RadiusPolicy {
                    slope: 5.0,
                    intercept: 1.0,
                },
                color_domain: ColorDomain::DataMax,
                color_range: (Rgb::PINK, Rgb::RED),
                circle_fill_alpha: CIRCLE_FILL_ALPHA,
                detail_zoom_threshold: DETAIL_ZOOM_THRESHOLD,
                detail_fade_ms: DETAIL_FADE_MS,
                pie: PieConfig {
                    mode: PieMode::EqualSlices,
                    label_stride: 2,
                    ..PieConfig::default()
                },
            },
        }
    }

    pub fn with_detail_threshold(mut self, threshold: u8) -> Self {
        self.detail_zoom_threshold = threshold;
        self
    }

    pub fn is_detail_visible(&self, zoom: u8) -> bool {
        zoom > self.detail_zoom_threshold
    }

    /// Duration color scale for the circles of a dataset whose longest
    /// stay is `data_max` minutes.
    pub fn duration_scale(&self, data_max: f64) -> LinearColorScale {
        LinearColorScale::new(self.color_domain.resolve(data_max), self.color_range)
    }
}
