use hotspot_shared::RenderContext;
use hotspot_shared::legend::title_subtitle;
use leptos::prelude::*;

use crate::canvas::MapCanvas;
use crate::config::ClientConfig;
use crate::icons::{ActivityIcons, load_activity_icons};
use crate::legend::{
    ActivityLegend, Attribution, DurationLegend, ErrorBanner, LoadingNotice, TitleBlock,
};
use crate::loader::load_dataset;
use crate::viewport::{INITIAL_CENTER, INITIAL_ZOOM, LayerOrigin, Viewport};

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

/// Overlay layout plus the projection it was laid out against. Between
/// settles the canvas bridges from `origin` to the live viewport.
#[derive(Debug, Clone)]
pub(crate) struct OverlayState {
    pub render: RenderContext,
    pub origin: LayerOrigin,
}

/// Newtype wrappers so same-typed signals don't overwrite each other in context.
#[derive(Clone, Copy)]
pub(crate) struct Overlay(pub RwSignal<Option<OverlayState>>);
#[derive(Clone, Copy)]
pub(crate) struct DetailVisible(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct Subtitle(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct Loading(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct LoadFailure(pub RwSignal<Option<String>>);

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    let (w, h) = canvas_dimensions();
    let viewport: RwSignal<Viewport> =
        RwSignal::new(Viewport::new(INITIAL_CENTER, INITIAL_ZOOM, w, h));
    let overlay: RwSignal<Option<OverlayState>> = RwSignal::new(None);
    let detail_visible: RwSignal<bool> = RwSignal::new(false);
    let subtitle: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_failure: RwSignal<Option<String>> = RwSignal::new(None);
    let icons: RwSignal<ActivityIcons> = RwSignal::new(ActivityIcons::default());

    provide_context(config.clone());
    provide_context(viewport);
    provide_context(icons);
    provide_context(Overlay(overlay));
    provide_context(DetailVisible(detail_visible));
    provide_context(Subtitle(subtitle));
    provide_context(Loading(loading));
    provide_context(LoadFailure(load_failure));

    load_activity_icons(icons);

    // Load first, lay out only on success. A failed load leaves the map
    // without overlays.
    let overlay_config = config.overlay;
    let dataset_url = config.dataset_url.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match load_dataset(&dataset_url).await {
            Ok(model) => {
                subtitle.set(title_subtitle(&model));
                let origin = viewport.get_untracked().layer_origin();
                let render = RenderContext::initial_render(
                    &model,
                    overlay_config,
                    &origin,
                    js_sys::Date::now(),
                );
                tracing::info!(
                    hotspots = model.len(),
                    skipped = model.skipped_records(),
                    zoom = render.zoom(),
                    "overlay ready"
                );
                detail_visible.set(render.detail_visible());
                overlay.set(Some(OverlayState { render, origin }));
            }
            Err(err) => {
                tracing::error!(url = %dataset_url, %err, "dataset load failed");
                load_failure.set(Some(err.to_string()));
            }
        }
        loading.set(false);
    });

    view! {
        <main style="position: fixed; inset: 0; overflow: hidden; background: #e8e6e1; font-family: 'Inter', system-ui, sans-serif; color: #1d1d1f;">
            <MapCanvas />
            <TitleBlock />
            <ActivityLegend />
            <DurationLegend />
            <LoadingNotice />
            <ErrorBanner />
            <Attribution />
        </main>
    }
}
