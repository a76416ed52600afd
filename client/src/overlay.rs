use std::f64::consts::{FRAC_PI_2, TAU};

use hotspot_shared::chart::TextAnchor;
use hotspot_shared::colors::rgba_css;
use hotspot_shared::layout::OverlayGroup;
use hotspot_shared::{RenderContext, ScreenPoint};
use web_sys::CanvasRenderingContext2d;

use crate::icons::ActivityIcons;
use crate::viewport::LayerTransform;

const CIRCLE_STROKE_WIDTH: f64 = 3.0;
const SLICE_STROKE: &str = "rgba(255,255,255,0.9)";
const LEADER_STROKE: &str = "rgba(40,40,40,0.7)";
const TEXT_FILL: &str = "#1d1d1f";
const TEXT_HALO: &str = "rgba(255,255,255,0.85)";
const DATE_FONT: &str = "11px system-ui, sans-serif";
const DURATION_FONT: &str = "600 13px system-ui, sans-serif";
const CATEGORY_FONT: &str = "11px system-ui, sans-serif";
const LABEL_FIRST_LINE: f64 = 14.0;
const LABEL_SECOND_LINE: f64 = 28.0;
const ICON_SIZE: f64 = 24.0;
const ICON_GAP: f64 = 18.0;
/// Extra room around a group for leader labels when culling.
const CULL_MARGIN: f64 = 90.0;

/// Canvas arcs start at three o'clock; chart angles start at twelve.
pub fn canvas_angle(chart_angle: f64) -> f64 {
    chart_angle - FRAC_PI_2
}

pub fn text_align(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "left",
        TextAnchor::End => "right",
    }
}

/// True when a group centered at `center` with screen extent `extent` can
/// touch the `w`×`h` container.
pub fn is_on_screen(center: ScreenPoint, extent: f64, w: f64, h: f64) -> bool {
    let reach = extent + CULL_MARGIN;
    center.x + reach >= 0.0 && center.y + reach >= 0.0 && center.x - reach <= w && center.y - reach <= h
}

pub struct OverlayFrame<'a> {
    pub ctx: &'a CanvasRenderingContext2d,
    pub w: f64,
    pub h: f64,
    pub render: &'a RenderContext,
    pub transform: LayerTransform,
    pub icons: &'a ActivityIcons,
    pub now: f64,
}

/// Paint every group in draw order (longest stay last, on top).
pub fn draw_overlay(frame: OverlayFrame<'_>) {
    let OverlayFrame {
        ctx,
        w,
        h,
        render,
        transform,
        icons,
        now,
    } = frame;

    let stroke = render.config().color_range.1.css();
    let detail_opacity = render.detail_opacity(now);

    for group in render.groups() {
        let center = transform.apply(group.translate);
        if !is_on_screen(center, group.circle.radius * transform.scale, w, h) {
            continue;
        }
        ctx.save();
        let _ = ctx.translate(center.x, center.y);
        let _ = ctx.scale(transform.scale, transform.scale);

        draw_circle(ctx, group, &stroke);
        if detail_opacity > 0.0 {
            ctx.set_global_alpha(detail_opacity);
            draw_pie(ctx, group);
            draw_label(ctx, group);
            draw_icon(ctx, group, icons);
        }

        ctx.restore();
    }
}

fn draw_circle(ctx: &CanvasRenderingContext2d, group: &OverlayGroup, stroke: &str) {
    let circle = &group.circle;
    ctx.begin_path();
    let _ = ctx.arc(0.0, 0.0, circle.radius, 0.0, TAU);
    ctx.set_fill_style_str(&rgba_css(circle.fill, circle.fill_alpha));
    ctx.fill();
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(CIRCLE_STROKE_WIDTH);
    ctx.stroke();
}

fn draw_pie(ctx: &CanvasRenderingContext2d, group: &OverlayGroup) {
    let pie = &group.pie;
    if pie.is_empty() {
        return;
    }

    ctx.set_stroke_style_str(SLICE_STROKE);
    ctx.set_line_width(1.0);
    for slice in &pie.slices {
        ctx.begin_path();
        ctx.move_to(0.0, 0.0);
        let _ = ctx.arc(
            0.0,
            0.0,
            pie.radius,
            canvas_angle(slice.start_angle),
            canvas_angle(slice.end_angle),
        );
        ctx.close_path();
        ctx.set_fill_style_str(&rgba_css(slice.fill, slice.alpha));
        ctx.fill();
        ctx.stroke();
    }

    ctx.set_font(DATE_FONT);
    ctx.set_text_baseline("middle");
    for leader in &pie.leaders {
        let [inner, outer, label] = leader.points;
        ctx.begin_path();
        ctx.move_to(inner.x, inner.y);
        ctx.line_to(outer.x, outer.y);
        ctx.line_to(label.x, label.y);
        ctx.set_stroke_style_str(LEADER_STROKE);
        ctx.stroke();

        ctx.set_text_align(text_align(leader.anchor));
        halo_text(ctx, &leader.label, label.x, label.y);
    }
}

fn draw_label(ctx: &CanvasRenderingContext2d, group: &OverlayGroup) {
    let r = group.circle.radius;
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font(DURATION_FONT);
    halo_text(ctx, &group.label.duration_text, 0.0, r + LABEL_FIRST_LINE);
    ctx.set_font(CATEGORY_FONT);
    halo_text(ctx, &group.label.category_text, 0.0, r + LABEL_SECOND_LINE);
}

fn draw_icon(ctx: &CanvasRenderingContext2d, group: &OverlayGroup, icons: &ActivityIcons) {
    let Some(image) = icons.get(group.activity) else {
        return;
    };
    let cy = -group.circle.radius - ICON_GAP;
    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
        image,
        -ICON_SIZE / 2.0,
        cy - ICON_SIZE / 2.0,
        ICON_SIZE,
        ICON_SIZE,
    );
}

fn halo_text(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64) {
    ctx.set_line_width(3.0);
    ctx.set_stroke_style_str(TEXT_HALO);
    let _ = ctx.stroke_text(text, x, y);
    ctx.set_fill_style_str(TEXT_FILL);
    let _ = ctx.fill_text(text, x, y);
    ctx.set_line_width(1.0);
}
