use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread::LocalKey;

use gloo_timers::callback::Timeout;
use hotspot_shared::layout::DetailTransition;
use hotspot_shared::projection::TILE_SIZE;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, PointerEvent,
    WheelEvent,
};

use crate::app::{DetailVisible, Overlay};
use crate::config::{SETTLE_DELAY_MS, TILE_URL_TEMPLATE};
use crate::icons::ActivityIcons;
use crate::overlay::{OverlayFrame, draw_overlay};
use crate::render_loop::RenderScheduler;
use crate::tiles::{TileKey, TileLoader, visible_tiles};
use crate::viewport::Viewport;

const BACKGROUND: &str = "#e8e6e1";
/// Accumulated wheel delta (in pixels) per zoom step.
const WHEEL_STEP_PX: f64 = 100.0;
const WHEEL_LINE_PX: f64 = 40.0;
const WHEEL_PAGE_PX: f64 = 800.0;

/// Pointer drag bookkeeping. `panned` stays set once the viewport moved,
/// even if the pointer later returns to where it started.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DragGesture {
    active: bool,
    last: (f64, f64),
    panned: bool,
}

impl DragGesture {
    fn begin(pos: (f64, f64)) -> Self {
        Self {
            active: true,
            last: pos,
            panned: false,
        }
    }

    /// Pixel delta since the previous pointer position, if any.
    fn move_to(&mut self, pos: (f64, f64)) -> Option<(f64, f64)> {
        if !self.active {
            return None;
        }
        let delta = (pos.0 - self.last.0, pos.1 - self.last.1);
        self.last = pos;
        if delta == (0.0, 0.0) {
            return None;
        }
        self.panned = true;
        Some(delta)
    }

    /// Finish the gesture. `Some(true)` when it moved the viewport.
    fn end(&mut self) -> Option<bool> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.panned)
    }
}

/// Normalize a wheel event delta to pixels.
pub fn wheel_delta_px(delta: f64, delta_mode: u32) -> f64 {
    match delta_mode {
        1 => delta * WHEEL_LINE_PX,
        2 => delta * WHEEL_PAGE_PX,
        _ => delta,
    }
}

/// Fold `delta` into `acc` and return whole zoom steps once the threshold is
/// crossed. Scrolling down (positive delta) zooms out.
pub fn wheel_steps(acc: &mut f64, delta: f64) -> i32 {
    *acc += delta;
    if acc.abs() < WHEEL_STEP_PX {
        return 0;
    }
    let steps = -(acc.signum() as i32);
    *acc = 0.0;
    steps
}

fn local_point(canvas: Option<HtmlCanvasElement>, client_x: i32, client_y: i32) -> (f64, f64) {
    canvas
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (client_x as f64 - rect.left(), client_y as f64 - rect.top())
        })
        .unwrap_or((client_x as f64, client_y as f64))
}

fn draw_tiles(ctx: &CanvasRenderingContext2d, vp: &Viewport, keys: &[TileKey], loader: &TileLoader) {
    for key in keys {
        let origin = key.screen_origin(vp);
        if let Some(image) = loader.image(*key) {
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &image, origin.x, origin.y, TILE_SIZE, TILE_SIZE,
            );
            continue;
        }
        // Stretch the parent quadrant until the tile itself arrives.
        let Some(parent) = key.parent() else {
            continue;
        };
        let Some(image) = loader.image(parent) else {
            continue;
        };
        let half = TILE_SIZE / 2.0;
        let sx = (key.x % 2) as f64 * half;
        let sy = (key.y % 2) as f64 * half;
        let _ = ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &image, sx, sy, half, half, origin.x, origin.y, TILE_SIZE, TILE_SIZE,
            );
    }
}

const KEY_PAN_PX: f64 = 80.0;

struct WindowBinding {
    window: web_sys::Window,
    event: &'static str,
    handler: Closure<dyn Fn(web_sys::Event)>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<WindowBinding>> = const { RefCell::new(None) };
    static KEYDOWN_BINDING: RefCell<Option<WindowBinding>> = const { RefCell::new(None) };
}

/// Attach a window listener, replacing whatever an earlier mount left in `slot`.
fn bind_window_listener(
    slot: &'static LocalKey<RefCell<Option<WindowBinding>>>,
    event: &'static str,
    handler: Closure<dyn Fn(web_sys::Event)>,
) {
    slot.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback(old.event, old.handler.as_ref().unchecked_ref());
        }
    });
    let Some(window) = web_sys::window() else {
        return;
    };
    if window
        .add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
        .is_ok()
    {
        slot.with(|slot| {
            *slot.borrow_mut() = Some(WindowBinding {
                window,
                event,
                handler,
            });
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Zoom(i32),
    /// Screen-space pan delta, same convention as dragging.
    Pan(f64, f64),
}

pub fn key_action(key: &str) -> Option<KeyAction> {
    match key {
        "+" | "=" => Some(KeyAction::Zoom(1)),
        "-" | "_" => Some(KeyAction::Zoom(-1)),
        "ArrowLeft" => Some(KeyAction::Pan(KEY_PAN_PX, 0.0)),
        "ArrowRight" => Some(KeyAction::Pan(-KEY_PAN_PX, 0.0)),
        "ArrowUp" => Some(KeyAction::Pan(0.0, KEY_PAN_PX)),
        "ArrowDown" => Some(KeyAction::Pan(0.0, -KEY_PAN_PX)),
        _ => None,
    }
}

/// Map host: tiles, pan/zoom input, settle notifications, and the overlay
/// layer painted on the same canvas.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let icons: RwSignal<ActivityIcons> = expect_context();
    let Overlay(overlay) = expect_context();
    let DetailVisible(detail_visible) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let drag = Rc::new(Cell::new(DragGesture::default()));
    let wheel_acc = Rc::new(Cell::new(0.0f64));

    let tile_revision: RwSignal<u32> = RwSignal::new(0);
    let tile_loader = TileLoader::new(TILE_URL_TEMPLATE, move || {
        tile_revision.update(|rev| *rev = rev.wrapping_add(1));
    });

    // Cached 2D context, invalidated whenever the canvas backing store resizes.
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    // Settle debounce: re-armed by every pan/zoom, never fires mid-drag.
    let settle_timer: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));

    let loader_render = tile_loader.clone();
    let scheduler = Rc::new(RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return false;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return false;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return false;
        }

        let dpr = web_sys::window()
            .map(|window| window.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let bw = (w * dpr).round() as u32;
        let bh = (h * dpr).round() as u32;
        if canvas.width() != bw || canvas.height() != bh {
            canvas.set_width(bw);
            canvas.set_height(bh);
            *cached_ctx.borrow_mut() = None;
        }
        let vp_size_changed = viewport.with_untracked(|vp| vp.width != w || vp.height != h);
        if vp_size_changed {
            viewport.update_untracked(|vp| vp.resize(w, h));
        }

        let ctx = {
            let mut cache = cached_ctx.borrow_mut();
            if cache.is_none() {
                *cache = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            }
            let Some(ctx) = cache.clone() else {
                return false;
            };
            ctx
        };
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        let vp = viewport.get_untracked();
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);

        let keys = visible_tiles(&vp);
        loader_render.request(&keys, vp.zoom);
        draw_tiles(&ctx, &vp, &keys, &loader_render);

        let now = js_sys::Date::now();
        overlay.with_untracked(|state| {
            let Some(state) = state else {
                return false;
            };
            icons.with_untracked(|icons| {
                draw_overlay(OverlayFrame {
                    ctx: &ctx,
                    w,
                    h,
                    render: &state.render,
                    transform: vp.layer_transform(&state.origin),
                    icons,
                    now,
                });
            });
            state.render.is_animating(now)
        })
    }));

    // Viewport settled: re-anchor the overlay to the current projection.
    let settle: Rc<dyn Fn()> = {
        let scheduler = scheduler.clone();
        Rc::new(move || {
            let (origin, center) = viewport.with_untracked(|vp| (vp.layer_origin(), vp.center()));
            let mut transition = DetailTransition::Unchanged;
            overlay.update(|state| {
                if let Some(state) = state {
                    let change = state.render.on_viewport_change(&origin, js_sys::Date::now());
                    state.origin = origin;
                    transition = change.detail;
                    tracing::debug!(
                        zoom = change.zoom,
                        lat = center.latitude,
                        lon = center.longitude,
                        "viewport settled"
                    );
                }
            });
            match transition {
                DetailTransition::Revealed => detail_visible.set(true),
                DetailTransition::Hidden => detail_visible.set(false),
                DetailTransition::Unchanged => {}
            }
            scheduler.mark_dirty();
        })
    };

    let schedule_settle: Rc<dyn Fn()> = {
        let settle_timer = settle_timer.clone();
        let drag = drag.clone();
        Rc::new(move || {
            let settle = settle.clone();
            let drag = drag.clone();
            // Dropping the previous timeout cancels it.
            *settle_timer.borrow_mut() = Some(Timeout::new(SETTLE_DELAY_MS, move || {
                if !drag.get().active {
                    settle();
                }
            }));
        })
    };

    let sched_vp = scheduler.clone();
    Effect::new(move || {
        viewport.track();
        overlay.track();
        icons.track();
        tile_revision.track();
        sched_vp.mark_dirty();
    });

    // Window resizes change the viewport size on the next frame; settle after.
    let resize_settle = schedule_settle.clone();
    let sched_resize = scheduler.clone();
    bind_window_listener(
        &RESIZE_BINDING,
        "resize",
        Closure::<dyn Fn(web_sys::Event)>::new(move |_: web_sys::Event| {
            sched_resize.mark_dirty();
            resize_settle();
        }),
    );

    let key_settle = schedule_settle.clone();
    bind_window_listener(
        &KEYDOWN_BINDING,
        "keydown",
        Closure::<dyn Fn(web_sys::Event)>::new(move |e: web_sys::Event| {
            let Some(e) = e.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let Some(action) = key_action(&e.key()) else {
                return;
            };
            let mut changed = false;
            viewport.update(|vp| {
                changed = match action {
                    KeyAction::Zoom(steps) => vp.zoom_at(steps, vp.width / 2.0, vp.height / 2.0),
                    KeyAction::Pan(dx, dy) => {
                        vp.pan(dx, dy);
                        true
                    }
                };
            });
            if changed {
                e.prevent_default();
                key_settle();
            }
        }),
    );

    // --- Input handlers ---

    let on_wheel = {
        let wheel_acc = wheel_acc.clone();
        let schedule_settle = schedule_settle.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let mut acc = wheel_acc.get();
            let steps = wheel_steps(&mut acc, wheel_delta_px(e.delta_y(), e.delta_mode()));
            wheel_acc.set(acc);
            if steps == 0 {
                return;
            }
            let (x, y) = local_point(canvas_ref.get_untracked(), e.client_x(), e.client_y());
            let mut zoomed = false;
            viewport.update(|vp| zoomed = vp.zoom_at(steps, x, y));
            if zoomed {
                schedule_settle();
            }
        }
    };

    let on_dblclick = {
        let schedule_settle = schedule_settle.clone();
        move |e: MouseEvent| {
            let (x, y) = local_point(canvas_ref.get_untracked(), e.client_x(), e.client_y());
            let step = if e.shift_key() { -1 } else { 1 };
            let mut zoomed = false;
            viewport.update(|vp| zoomed = vp.zoom_at(step, x, y));
            if zoomed {
                schedule_settle();
            }
        }
    };

    let on_pointer_down = {
        let drag = drag.clone();
        move |e: PointerEvent| {
            drag.set(DragGesture::begin((e.client_x() as f64, e.client_y() as f64)));

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let drag = drag.clone();
        let schedule_settle = schedule_settle.clone();
        move |e: PointerEvent| {
            let mut gesture = drag.get();
            let delta = gesture.move_to((e.client_x() as f64, e.client_y() as f64));
            drag.set(gesture);
            let Some((dx, dy)) = delta else {
                return;
            };
            viewport.update(|vp| vp.pan(dx, dy));
            schedule_settle();
        }
    };

    let on_pointer_up = {
        let drag = drag.clone();
        let schedule_settle = schedule_settle.clone();
        move |e: PointerEvent| {
            let mut gesture = drag.get();
            let ended = gesture.end();
            drag.set(gesture);
            let Some(panned) = ended else {
                return;
            };
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
            // Timeouts armed mid-drag were skipped, so any pan settles here.
            if panned {
                schedule_settle();
            }
        }
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:dblclick=on_dblclick
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up.clone()
            on:pointercancel=on_pointer_up
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}
