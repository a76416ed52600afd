use hotspot_shared::LinearColorScale;
use hotspot_shared::legend::{
    GRADIENT_BOTTOM_LABEL, GRADIENT_SAMPLES, GRADIENT_TOP_LABEL, activity_legend,
    duration_gradient, gradient_css, title_heading,
};
use leptos::prelude::*;

use crate::app::{DetailVisible, LoadFailure, Loading, Subtitle};
use crate::config::{ClientConfig, TILE_ATTRIBUTION};

const PANEL_STYLE: &str = "position: absolute; z-index: 10; background: rgba(255,255,255,0.92); border: 1px solid rgba(0,0,0,0.12); border-radius: 6px; box-shadow: 0 2px 10px rgba(0,0,0,0.15); pointer-events: none;";

/// Heading and observation window, top left.
#[component]
pub fn TitleBlock() -> impl IntoView {
    let DetailVisible(detail_visible) = expect_context();
    let Subtitle(subtitle) = expect_context();

    view! {
        <div style=format!("{PANEL_STYLE} top: 16px; left: 16px; padding: 10px 14px;")>
            <div style="font-size: 1.05rem; font-weight: 700;">
                {move || title_heading(detail_visible.get())}
            </div>
            {move || subtitle.get().map(|text| view! {
                <div style="font-size: 0.78rem; color: #5a5860; margin-top: 2px; font-variant-numeric: tabular-nums;">
                    {text}
                </div>
            })}
        </div>
    }
}

/// Icon key for the three activity levels, top right.
#[component]
pub fn ActivityLegend() -> impl IntoView {
    let rows = activity_legend();

    view! {
        <div style=format!("{PANEL_STYLE} top: 16px; right: 16px; padding: 8px 12px; display: flex; flex-direction: column; gap: 6px;")>
            {rows
                .into_iter()
                .map(|row| view! {
                    <div style="display: flex; align-items: center; gap: 8px; font-size: 0.78rem;">
                        <img src=row.icon_src alt=row.label width="20" height="20" />
                        <span>{row.label}</span>
                    </div>
                })
                .collect_view()}
        </div>
    }
}

/// Duration color strip, bottom left. Longest stays on top.
#[component]
pub fn DurationLegend() -> impl IntoView {
    let config: ClientConfig = expect_context();
    let scale = LinearColorScale::new((0.0, 1.0), config.overlay.color_range);
    let background = gradient_css(&duration_gradient(&scale, GRADIENT_SAMPLES));

    view! {
        <div style=format!("{PANEL_STYLE} bottom: 28px; left: 16px; padding: 8px 10px; display: flex; gap: 8px; align-items: stretch;")>
            <div style=format!("width: 14px; height: 120px; border-radius: 3px; background: {background};") />
            <div style="display: flex; flex-direction: column; justify-content: space-between; font-size: 0.72rem; color: #5a5860;">
                <span>{GRADIENT_TOP_LABEL}</span>
                <span>{GRADIENT_BOTTOM_LABEL}</span>
            </div>
        </div>
    }
}

#[component]
pub fn LoadingNotice() -> impl IntoView {
    let Loading(loading) = expect_context();

    view! {
        <Show when=move || loading.get()>
            <div style=format!("{PANEL_STYLE} top: 16px; left: 50%; transform: translateX(-50%); padding: 6px 12px; font-size: 0.78rem; color: #5a5860;")>
                "Loading hotspots\u{2026}"
            </div>
        </Show>
    }
}

/// Shown when the dataset could not be loaded; the map stays usable.
#[component]
pub fn ErrorBanner() -> impl IntoView {
    let LoadFailure(load_failure) = expect_context();

    view! {
        {move || load_failure.get().map(|message| view! {
            <div
                role="alert"
                style="position: absolute; z-index: 20; top: 16px; left: 50%; transform: translateX(-50%); padding: 8px 14px; background: #fdecea; border: 1px solid #e0b4b0; border-radius: 6px; color: #8b1a10; font-size: 0.8rem; max-width: 60%;"
            >
                "Could not load hotspot data: " {message}
            </div>
        })}
    }
}

#[component]
pub fn Attribution() -> impl IntoView {
    view! {
        <div style="position: absolute; z-index: 10; right: 0; bottom: 0; padding: 2px 6px; background: rgba(255,255,255,0.8); font-size: 0.68rem; color: #333;">
            <a href="https://www.openstreetmap.org/copyright" target="_blank" rel="noopener" style="color: inherit;">
                {TILE_ATTRIBUTION}
            </a>
        </div>
    }
}
