//! Per-hotspot pie chart geometry.
//!
//! Angles follow the usual chart convention: 0 at twelve o'clock, growing
//! clockwise, in radians. All points are relative to the pie center, with
//! screen y pointing down.

use std::f64::consts::{PI, TAU};

use chrono::NaiveDate;
use crate::colors::{LinearColorScale, Rgb, fill_alpha};
use crate::config::{PieConfig, PieMode};
use crate::hotspot::DailyStay;
use crate::projection::ScreenPoint;

const INNER_CENTROID_RATIO: f64 = 0.5;
const OUTER_ARC_RATIO: f64 = 1.1;
const LABEL_RATIO: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub date: NaiveDate,
    pub stay_duration_minutes: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub fill: Rgb,
    pub alpha: f64,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text grows rightwards from the anchor.
    Start,
    /// Text ends at the anchor.
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderLine {
    pub slice_index: usize,
    /// Inner slice centroid, outer arc centroid, label anchor.
    pub points: [ScreenPoint; 3],
    pub anchor: TextAnchor,
    pub label: String,
}

impl LeaderLine {
    pub fn label_position(&self) -> ScreenPoint {
        self.points[2]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub radius: f64,
    pub slices: Vec<PieSlice>,
    pub leaders: Vec<LeaderLine>,
    label_stride: usize,
    label_offset: f64,
}

/// Point on the circle of `radius` at `angle`.
pub fn polar(angle: f64, radius: f64) -> ScreenPoint {
    ScreenPoint::new(radius * angle.sin(), -radius * angle.cos())
}

pub fn anchor_for(mid_angle: f64) -> TextAnchor {
    if mid_angle < PI {
        TextAnchor::Start
    } else {
        TextAnchor::End
    }
}

pub fn format_slice_date(date: NaiveDate) -> String {
    date.format("%d.%m.").to_string()
}

/// Lay out one slice per time-statistics entry, in chart order.
pub fn build_pie(stats: &[DailyStay], radius: f64, config: &PieConfig) -> PieChart {
    let max_daily = stats
        .iter()
        .map(|s| s.stay_duration_minutes)
        .fold(0.0f64, f64::max);
    let total: f64 = stats.iter().map(|s| s.stay_duration_minutes).sum();
    let weighted = matches!(config.mode, PieMode::DurationWeighted) && total > 0.0;

    let minutes_scale = LinearColorScale::new((0.0, max_daily), config.slice_color_range);
    let unit_scale = LinearColorScale::new((0.0, 1.0), config.slice_color_range);

    let mut slices = Vec::with_capacity(stats.len());
    let mut angle = 0.0;
    for stat in stats {
        let sweep = if weighted {
            TAU * stat.stay_duration_minutes / total
        } else {
            TAU / stats.len() as f64
        };
        let fill = match config.mode {
            PieMode::DurationWeighted => minutes_scale.color(stat.stay_duration_minutes),
            PieMode::EqualSlices => {
                let t = if max_daily > 0.0 {
                    stat.stay_duration_minutes / max_daily
                } else {
                    0.0
                };
                unit_scale.color(t)
            }
        };
        slices.push(PieSlice {
            date: stat.date,
            stay_duration_minutes: stat.stay_duration_minutes,
            start_angle: angle,
            end_angle: angle + sweep,
            fill,
            alpha: fill_alpha(fill, config.slice_alpha),
        });
        angle += sweep;
    }

    let mut chart = PieChart {
        radius,
        slices,
        leaders: Vec::new(),
        label_stride: config.label_stride,
        label_offset: config.label_offset,
    };
    chart.layout_leaders();
    chart
}

impl PieChart {
    /// Recompute radius-dependent geometry, keeping slices and their colors.
    pub fn resize(&mut self, radius: f64) {
        if self.radius == radius {
            return;
        }
        self.radius = radius;
        self.layout_leaders();
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Zero-width slices get no leader; two of them would stack their
    /// labels at twelve o'clock.
    fn layout_leaders(&mut self) {
        let r = self.radius;
        self.leaders = self
            .slices
            .iter()
            .enumerate()
            .step_by(self.label_stride.max(1))
            .filter(|(_, slice)| slice.sweep() > 0.0)
            .map(|(slice_index, slice)| {
                let mid = slice.mid_angle();
                let inner = polar(mid, r * INNER_CENTROID_RATIO);
                let outer = polar(mid, r * OUTER_ARC_RATIO);
                let anchor = anchor_for(mid);
                let side = match anchor {
                    TextAnchor::Start => 1.0,
                    TextAnchor::End => -1.0,
                };
                let label = ScreenPoint::new(r * LABEL_RATIO * self.label_offset * side, outer.y);
                LeaderLine {
                    slice_index,
                    points: [inner, outer, label],
                    anchor,
                    label: format_slice_date(slice.date),
                }
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn stats(minutes: &[f64]) -> Vec<DailyStay> {
        minutes
            .iter()
            .enumerate()
            .map(|(i, &m)| DailyStay {
                date: NaiveDate::from_ymd_opt(2023, 1, 1 + i as u32).expect("valid date"),
                stay_duration_minutes: m,
            })
            .collect()
    }

    #[test]
    fn duration_weighted_slices_are_proportional() {
        let pie = build_pie(&stats(&[30.0, 60.0]), 50.0, &PieConfig::default());
        assert_eq!(pie.slices.len(), 2);
        assert_close(pie.slices[0].sweep(), TAU / 3.0);
        assert_close(pie.slices[1].sweep(), TAU * 2.0 / 3.0);
        assert_close(pie.slices[1].end_angle, TAU);
    }

    #[test]
    fn equal_slices_ignore_duration() {
        let config = PieConfig {
            mode: PieMode::EqualSlices,
            ..PieConfig::default()
        };
        let pie = build_pie(&stats(&[5.0, 500.0, 50.0, 0.0]), 50.0, &config);
        for slice in &pie.slices {
            assert_close(slice.sweep(), TAU / 4.0);
        }
        assert_eq!(pie.slices[1].fill, Rgb::DARK_RED);
    }

    #[test]
    fn all_zero_durations_fall_back_to_equal_slices() {
        let pie = build_pie(&stats(&[0.0, 0.0]), 10.0, &PieConfig::default());
        assert_close(pie.slices[0].sweep(), PI);
        assert_close(pie.slices[1].sweep(), PI);
    }

    #[test]
    fn minimum_slice_is_translucent_white() {
        let pie = build_pie(&stats(&[0.0, 60.0]), 40.0, &PieConfig::default());
        assert_eq!(pie.slices[0].fill, Rgb::WHITE);
        assert_close(pie.slices[0].alpha, 0.2);
        assert_eq!(pie.slices[1].fill, Rgb::DARK_RED);
        assert_close(pie.slices[1].alpha, 0.85);
    }

    #[test]
    fn leader_lines_pick_side_from_mid_angle() {
        let pie = build_pie(&stats(&[30.0, 60.0]), 100.0, &PieConfig::default());
        let first = &pie.leaders[0];
        assert_eq!(first.anchor, TextAnchor::Start);
        assert!(first.label_position().x > 0.0);
        let second = &pie.leaders[1];
        // mid angle of the second slice is 4π/3
        assert_eq!(second.anchor, TextAnchor::End);
        assert_close(second.label_position().x, -120.0);
        assert_close(second.points[1].y, second.points[2].y);
    }

    #[test]
    fn leader_line_passes_through_inner_and_outer_centroids() {
        let pie = build_pie(&stats(&[1.0, 1.0, 1.0, 1.0]), 100.0, &PieConfig::default());
        let first = &pie.leaders[0];
        // first quarter: mid angle π/4
        let expected_inner = polar(PI / 4.0, 50.0);
        let expected_outer = polar(PI / 4.0, 110.0);
        assert_close(first.points[0].x, expected_inner.x);
        assert_close(first.points[0].y, expected_inner.y);
        assert_close(first.points[1].x, expected_outer.x);
        assert_close(first.points[1].y, expected_outer.y);
        assert!(first.points[1].y < 0.0, "upper right quadrant is above center");
    }

    #[test]
    fn every_second_slice_labelled() {
        let config = PieConfig {
            label_stride: 2,
            ..PieConfig::default()
        };
        let pie = build_pie(&stats(&[10.0; 10]), 60.0, &config);
        let indices: Vec<usize> = pie.leaders.iter().map(|l| l.slice_index).collect();
        assert_eq!(indices, vec![0, 2, 4, 6, 8]);
        assert_eq!(pie.leaders[1].label, "03.01.");
    }

    #[test]
    fn resize_keeps_slices_and_moves_leaders() {
        let mut pie = build_pie(&stats(&[30.0, 60.0]), 50.0, &PieConfig::default());
        let slices_before = pie.slices.clone();
        let label_before = pie.leaders[0].label_position();
        pie.resize(100.0);
        assert_eq!(pie.slices, slices_before);
        assert_close(pie.leaders[0].label_position().x, label_before.x * 2.0);
    }

    #[test]
    fn zero_stride_is_treated_as_one() {
        let config = PieConfig {
            label_stride: 0,
            ..PieConfig::default()
        };
        let mut pie = build_pie(&stats(&[1.0, 2.0, 3.0]), 10.0, &config);
        assert_eq!(pie.leaders.len(), 3);
        pie.resize(20.0);
        assert_eq!(pie.leaders.len(), 3);
    }

    #[test]
    fn empty_days_get_no_leader_line() {
        let pie = build_pie(&stats(&[0.0, 60.0, 0.0]), 50.0, &PieConfig::default());
        assert_eq!(pie.slices.len(), 3);
        let indices: Vec<usize> = pie.leaders.iter().map(|l| l.slice_index).collect();
        assert_eq!(indices, vec![1]);
        assert_eq!(pie.leaders[0].label, "02.01.");
    }

    #[test]
    fn empty_days_keep_leaders_with_equal_slices() {
        let config = PieConfig {
            mode: PieMode::EqualSlices,
            ..PieConfig::default()
        };
        let pie = build_pie(&stats(&[0.0, 60.0, 0.0]), 50.0, &config);
        assert_eq!(pie.leaders.len(), 3);
    }
}
