//! Viewport-synchronized overlay layout.
//!
//! [`RenderContext`] owns one [`OverlayGroup`] per hotspot. Groups are built
//! once from the model and afterwards only repositioned and resized when the
//! map host reports a settled viewport.

use crate::chart::{PieChart, build_pie};
use crate::colors::{Rgb, fill_alpha};
use crate::config::OverlayConfig;
use crate::duration_format::{format_stay, stay_category};
use crate::hotspot::{ActivityLevel, GeoPoint, HotspotId, VisualizationModel};
use crate::projection::{MapProjection, ScreenPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    pub radius: f64,
    pub fill: Rgb,
    pub fill_alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotspotLabel {
    pub duration_text: String,
    pub category_text: String,
}

/// Everything drawn for one hotspot, anchored at `translate`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayGroup {
    pub id: HotspotId,
    pub position: GeoPoint,
    pub stay_duration_minutes: f64,
    pub translate: ScreenPoint,
    pub circle: CircleShape,
    pub label: HotspotLabel,
    pub activity: ActivityLevel,
    pub pie: PieChart,
}

/// Opacity state of labels, pie charts and activity icons. Reveals fade in,
/// hides are immediate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailFade {
    Hidden,
    FadingIn { start: f64, duration: f64 },
    Visible,
}

impl DetailFade {
    pub fn is_shown(&self) -> bool {
        !matches!(self, DetailFade::Hidden)
    }

    pub fn opacity(&self, now: f64) -> f64 {
        match *self {
            DetailFade::Hidden => 0.0,
            DetailFade::Visible => 1.0,
            DetailFade::FadingIn { start, duration } => {
                let elapsed = now - start;
                if elapsed >= duration {
                    1.0
                } else {
                    cubic_ease_out((elapsed / duration).max(0.0))
                }
            }
        }
    }

    pub fn is_animating(&self, now: f64) -> bool {
        match *self {
            DetailFade::FadingIn { start, duration } => now - start < duration,
            _ => false,
        }
    }

    fn reveal(self, now: f64, duration: f64) -> Self {
        match self {
            DetailFade::Hidden if duration > 0.0 => DetailFade::FadingIn {
                start: now,
                duration,
            },
            DetailFade::Hidden => DetailFade::Visible,
            shown => shown,
        }
    }
}

/// Cubic ease-out: decelerating to zero velocity.
fn cubic_ease_out(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t + 1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTransition {
    Unchanged,
    Revealed,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportChange {
    pub zoom: u8,
    pub detail: DetailTransition,
}

/// Layout state for one render session.
#[derive(Debug, Clone)]
pub struct RenderContext {
    config: OverlayConfig,
    groups: Vec<OverlayGroup>,
    zoom: u8,
    detail: DetailFade,
}

impl RenderContext {
    /// Create every hotspot group in model order, so the longest stay ends
    /// up last and paints on top.
    pub fn initial_render<P: MapProjection + ?Sized>(
        model: &VisualizationModel,
        config: OverlayConfig,
        host: &P,
        now: f64,
    ) -> Self {
        let zoom = host.zoom();
        let radius = config.radius.radius(zoom);
        let color_scale = config.duration_scale(model.max_stay_minutes());

        let groups: Vec<OverlayGroup> = model
            .iter()
            .map(|(id, hotspot)| {
                let fill = color_scale.color(hotspot.stay_duration_minutes);
                OverlayGroup {
                    id,
                    position: hotspot.position,
                    stay_duration_minutes: hotspot.stay_duration_minutes,
                    translate: host.project(hotspot.position),
                    circle: CircleShape {
                        radius,
                        fill,
                        fill_alpha: fill_alpha(fill, config.circle_fill_alpha),
                    },
                    label: HotspotLabel {
                        duration_text: format_stay(hotspot.stay_duration_minutes),
                        category_text: stay_category(hotspot.stay_duration_minutes).to_string(),
                    },
                    activity: hotspot.dominant_activity_level,
                    pie: build_pie(&hotspot.time_statistics, radius, &config.pie),
                }
            })
            .collect();

        let detail = if config.is_detail_visible(zoom) {
            DetailFade::Hidden.reveal(now, config.detail_fade_ms)
        } else {
            DetailFade::Hidden
        };

        tracing::debug!(
            groups = groups.len(),
            zoom,
            detail = detail.is_shown(),
            "initial overlay render"
        );

        Self {
            config,
            groups,
            zoom,
            detail,
        }
    }

    /// Re-anchor every group to the settled viewport. Only geometry changes:
    /// labels, colors and slices stay as built.
    pub fn on_viewport_change<P: MapProjection + ?Sized>(
        &mut self,
        host: &P,
        now: f64,
    ) -> ViewportChange {
        let zoom = host.zoom();
        let radius = self.config.radius.radius(zoom);
        for group in &mut self.groups {
            group.translate = host.project(group.position);
            group.circle.radius = radius;
            group.pie.resize(radius);
        }
        self.zoom = zoom;

        let was_shown = self.detail.is_shown();
        let show = self.config.is_detail_visible(zoom);
        let transition = match (was_shown, show) {
            (false, true) => {
                self.detail = self.detail.reveal(now, self.config.detail_fade_ms);
                DetailTransition::Revealed
            }
            (true, false) => {
                self.detail = DetailFade::Hidden;
                DetailTransition::Hidden
            }
            _ => DetailTransition::Unchanged,
        };

        if transition != DetailTransition::Unchanged {
            tracing::debug!(zoom, ?transition, "detail visibility changed");
        }

        ViewportChange {
            zoom,
            detail: transition,
        }
    }

    pub fn groups(&self) -> &[OverlayGroup] {
        &self.groups
    }

    pub fn group(&self, id: HotspotId) -> Option<&OverlayGroup> {
        self.groups.get(id.0)
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn detail_visible(&self) -> bool {
        self.detail.is_shown()
    }

    pub fn detail_opacity(&self, now: f64) -> f64 {
        self.detail.opacity(now)
    }

    /// True while a detail fade-in still needs frames.
    pub fn is_animating(&self, now: f64) -> bool {
        self.detail.is_animating(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::dataset::parse_dataset;
    use crate::hotspot::{DailyStay, Hotspot};
    use chrono::NaiveDate;

    /// Flat projection: one degree is 100 px, zoom is set by hand.
    struct FakeHost {
        zoom: u8,
        offset: ScreenPoint,
    }

    impl FakeHost {
        fn at(zoom: u8) -> Self {
            Self {
                zoom,
                offset: ScreenPoint::default(),
            }
        }
    }

    impl MapProjection for FakeHost {
        fn project(&self, point: GeoPoint) -> ScreenPoint {
            ScreenPoint::new(
                point.longitude * 100.0 + self.offset.x,
                -point.latitude * 100.0 + self.offset.y,
            )
        }

        fn zoom(&self) -> u8 {
            self.zoom
        }
    }

    fn hotspot(minutes: f64, lon: f64) -> Hotspot {
        Hotspot {
            position: GeoPoint::new(48.0, lon),
            stay_duration_minutes: minutes,
            dominant_activity_level: ActivityLevel::LowActivity,
            time_statistics: vec![DailyStay {
                date: NaiveDate::from_ymd_opt(2023, 5, 1).expect("valid date"),
                stay_duration_minutes: minutes,
            }],
        }
    }

    fn model() -> VisualizationModel {
        VisualizationModel::new(
            vec![hotspot(300.0, 14.0), hotspot(20.0, 15.0), hotspot(90.0, 16.0)],
            0,
        )
    }

    #[test]
    fn example_scenario_at_zoom_15() {
        let payload = r#"[{"positions":[{"longitude":14.28,"latitude":48.30}],
            "minutesSpentInCluster":90,"dominantActivityLevel":2,
            "timeStatistics":[{"date":"2023-01-01","stayDurationInMinutes":30},
                              {"date":"2023-01-02","stayDurationInMinutes":60}]}]"#;
        let model = parse_dataset(payload).expect("dataset should parse");
        let config = OverlayConfig::preset(Preset::Classic).with_detail_threshold(13);
        let ctx = RenderContext::initial_render(&model, config, &FakeHost::at(15), 0.0);

        assert_eq!(ctx.groups().len(), 1);
        let group = &ctx.groups()[0];
        assert_eq!(group.label.duration_text, "~1h 30min");
        assert_eq!(group.activity, ActivityLevel::Active);
        assert_eq!(group.circle.radius, 61.0);
        assert!(ctx.detail_visible());
        let minutes: Vec<f64> = group
            .pie
            .slices
            .iter()
            .map(|s| s.stay_duration_minutes)
            .collect();
        assert_eq!(minutes, vec![30.0, 60.0]);
        assert!(group.pie.slices[1].sweep() > group.pie.slices[0].sweep());
    }

    #[test]
    fn longest_stay_is_drawn_last() {
        let ctx = RenderContext::initial_render(
            &model(),
            OverlayConfig::default(),
            &FakeHost::at(8),
            0.0,
        );
        let last = ctx.groups().last().expect("groups");
        assert_eq!(last.stay_duration_minutes, 300.0);
        let order: Vec<f64> = ctx
            .groups()
            .iter()
            .map(|g| g.stay_duration_minutes)
            .collect();
        assert_eq!(order, vec![20.0, 90.0, 300.0]);
    }

    #[test]
    fn circle_colors_span_the_scale() {
        let mut hotspots = vec![hotspot(0.0, 14.0), hotspot(600.0, 15.0)];
        hotspots.push(hotspot(300.0, 16.0));
        let model = VisualizationModel::new(hotspots, 0);
        let ctx = RenderContext::initial_render(
            &model,
            OverlayConfig::default(),
            &FakeHost::at(8),
            0.0,
        );
        assert_eq!(ctx.groups()[0].circle.fill, Rgb::PINK);
        assert_eq!(ctx.groups()[2].circle.fill, Rgb::RED);
    }

    #[test]
    fn viewport_change_repositions_and_resizes() {
        let mut ctx = RenderContext::initial_render(
            &model(),
            OverlayConfig::default(),
            &FakeHost::at(8),
            0.0,
        );
        let before = ctx.groups()[0].translate;
        let host = FakeHost {
            zoom: 10,
            offset: ScreenPoint::new(-40.0, 25.0),
        };
        let change = ctx.on_viewport_change(&host, 10.0);

        assert_eq!(change.zoom, 10);
        assert_eq!(ctx.zoom(), 10);
        assert_eq!(change.detail, DetailTransition::Unchanged);
        let after = ctx.groups()[0].translate;
        assert_eq!(after.x, before.x - 40.0);
        assert_eq!(after.y, before.y + 25.0);
        for group in ctx.groups() {
            assert_eq!(group.circle.radius, 41.0);
            assert_eq!(group.pie.radius, 41.0);
        }
    }

    #[test]
    fn repeated_viewport_change_is_idempotent() {
        let mut ctx = RenderContext::initial_render(
            &model(),
            OverlayConfig::default(),
            &FakeHost::at(8),
            0.0,
        );
        let host = FakeHost {
            zoom: 14,
            offset: ScreenPoint::new(13.5, -7.25),
        };
        ctx.on_viewport_change(&host, 100.0);
        let first = ctx.groups().to_vec();
        let change = ctx.on_viewport_change(&host, 200.0);
        assert_eq!(ctx.groups(), first.as_slice());
        assert_eq!(change.detail, DetailTransition::Unchanged);
    }

    #[test]
    fn detail_boundary_is_strict() {
        let config = OverlayConfig::default().with_detail_threshold(13);
        let mut ctx = RenderContext::initial_render(&model(), config, &FakeHost::at(13), 0.0);
        assert!(!ctx.detail_visible());
        assert_eq!(ctx.detail_opacity(0.0), 0.0);

        let change = ctx.on_viewport_change(&FakeHost::at(14), 1_000.0);
        assert_eq!(change.detail, DetailTransition::Revealed);
        assert!(ctx.detail_visible());
    }

    #[test]
    fn reveal_fades_in_and_hide_is_instant() {
        let config = OverlayConfig::default().with_detail_threshold(13);
        let fade = config.detail_fade_ms;
        let mut ctx = RenderContext::initial_render(&model(), config, &FakeHost::at(10), 0.0);

        ctx.on_viewport_change(&FakeHost::at(15), 1_000.0);
        assert_eq!(ctx.detail_opacity(1_000.0), 0.0);
        let mid = ctx.detail_opacity(1_000.0 + fade / 2.0);
        assert!(mid > 0.5 && mid < 1.0, "eased midpoint was {mid}");
        assert!(ctx.is_animating(1_000.0 + fade / 2.0));
        assert_eq!(ctx.detail_opacity(1_000.0 + fade), 1.0);
        assert!(!ctx.is_animating(1_000.0 + fade));

        let change = ctx.on_viewport_change(&FakeHost::at(12), 1_000.0 + fade / 4.0);
        assert_eq!(change.detail, DetailTransition::Hidden);
        assert_eq!(ctx.detail_opacity(1_000.0 + fade / 4.0), 0.0);
        assert!(!ctx.is_animating(1_000.0 + fade / 4.0));
    }

    #[test]
    fn staying_above_threshold_does_not_restart_fade() {
        let config = OverlayConfig::default().with_detail_threshold(13);
        let mut ctx = RenderContext::initial_render(&model(), config, &FakeHost::at(14), 0.0);
        ctx.on_viewport_change(&FakeHost::at(15), 5_000.0);
        assert_eq!(ctx.detail_opacity(5_000.0), 1.0);
    }

    #[test]
    fn zero_fade_reveals_immediately() {
        let mut config = OverlayConfig::default().with_detail_threshold(13);
        config.detail_fade_ms = 0.0;
        let mut ctx = RenderContext::initial_render(&model(), config, &FakeHost::at(3), 0.0);
        ctx.on_viewport_change(&FakeHost::at(14), 50.0);
        assert_eq!(ctx.detail_opacity(50.0), 1.0);
    }

    #[test]
    fn daily_breakdown_labels_every_second_day() {
        let stats: Vec<DailyStay> = (1..=10)
            .map(|d| DailyStay {
                date: NaiveDate::from_ymd_opt(2023, 2, d).expect("valid date"),
                stay_duration_minutes: 10.0 * d as f64,
            })
            .collect();
        let model = VisualizationModel::new(
            vec![Hotspot {
                position: GeoPoint::new(48.3, 14.28),
                stay_duration_minutes: 550.0,
                dominant_activity_level: ActivityLevel::Rest,
                time_statistics: stats,
            }],
            0,
        );
        let config = OverlayConfig::preset(Preset::DailyBreakdown);
        assert_eq!(config.pie.label_stride, 2);
        let ctx = RenderContext::initial_render(&model, config, &FakeHost::at(15), 0.0);
        let pie = &ctx.groups()[0].pie;
        assert_eq!(pie.slices.len(), 10);
        assert_eq!(pie.leaders.len(), 5);
        let indices: Vec<usize> = pie.leaders.iter().map(|l| l.slice_index).collect();
        assert_eq!(indices, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn groups_are_addressable_by_id() {
        let ctx = RenderContext::initial_render(
            &model(),
            OverlayConfig::default(),
            &FakeHost::at(8),
            0.0,
        );
        let group = ctx.group(HotspotId(1)).expect("group 1");
        assert_eq!(group.id, HotspotId(1));
        assert_eq!(group.stay_duration_minutes, 90.0);
        assert!(ctx.group(HotspotId(3)).is_none());
    }
}
