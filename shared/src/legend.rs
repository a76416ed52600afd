use chrono::NaiveDate;

use crate::colors::{LinearColorScale, Rgb};
use crate::hotspot::{ActivityLevel, VisualizationModel};

pub const GRADIENT_SAMPLES: usize = 11;
pub const GRADIENT_TOP_LABEL: &str = "Long";
pub const GRADIENT_BOTTOM_LABEL: &str = "Short";

pub const TITLE_OVERVIEW: &str = "Where did the time go?";
pub const TITLE_DETAIL: &str = "Time spent per day";

/// One stop of the duration legend strip. `offset` runs from 0 (top,
/// longest stay) to 1 (bottom, shortest stay).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgb,
}

/// Evenly sample the color scale for a vertical strip, longest on top.
pub fn duration_gradient(scale: &LinearColorScale, samples: usize) -> Vec<GradientStop> {
    match samples {
        0 => Vec::new(),
        1 => vec![GradientStop {
            offset: 0.0,
            color: scale.color_at(1.0),
        }],
        n => (0..n)
            .map(|i| {
                let offset = i as f64 / (n - 1) as f64;
                GradientStop {
                    offset,
                    color: scale.color_at(1.0 - offset),
                }
            })
            .collect(),
    }
}

/// CSS `linear-gradient` for the strip.
pub fn gradient_css(stops: &[GradientStop]) -> String {
    let parts: Vec<String> = stops
        .iter()
        .map(|stop| format!("{} {:.0}%", stop.color.css(), stop.offset * 100.0))
        .collect();
    format!("linear-gradient(to bottom, {})", parts.join(", "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityLegendRow {
    pub level: ActivityLevel,
    pub label: &'static str,
    pub icon_src: &'static str,
}

pub fn activity_legend() -> [ActivityLegendRow; 3] {
    ActivityLevel::ALL.map(|level| ActivityLegendRow {
        level,
        label: level.label(),
        icon_src: level.icon_src(),
    })
}

pub fn title_heading(detail_visible: bool) -> &'static str {
    if detail_visible {
        TITLE_DETAIL
    } else {
        TITLE_OVERVIEW
    }
}

fn format_day(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Observation window across every hotspot, e.g. `01.01.2023 – 14.01.2023`.
pub fn title_subtitle(model: &VisualizationModel) -> Option<String> {
    let (first, last) = model.date_range()?;
    if first == last {
        Some(format_day(first))
    } else {
        Some(format!("{} – {}", format_day(first), format_day(last)))
    }
}
