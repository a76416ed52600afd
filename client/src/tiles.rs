#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use hotspot_shared::ScreenPoint;
use hotspot_shared::projection::TILE_SIZE;
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::viewport::Viewport;

const MAX_CONCURRENCY: usize = 6;
const MAX_CACHED_TILES: usize = 256;
const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
const ONLOAD_HANDLE_KEY: &str = "__hotspotTileOnload";
const ONERROR_HANDLE_KEY: &str = "__hotspotTileOnerror";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn parent(&self) -> Option<TileKey> {
        (self.z > 0).then(|| TileKey {
            z: self.z - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// Top-left corner relative to the container, for the viewport's zoom.
    pub fn screen_origin(&self, vp: &Viewport) -> ScreenPoint {
        let top_left = vp.top_left();
        ScreenPoint::new(
            self.x as f64 * TILE_SIZE - top_left.x,
            self.y as f64 * TILE_SIZE - top_left.y,
        )
    }
}

/// Tiles covering the viewport, nearest to the center first.
pub fn visible_tiles(vp: &Viewport) -> Vec<TileKey> {
    if vp.width <= 0.0 || vp.height <= 0.0 {
        return Vec::new();
    }
    let max_index = (1u64 << vp.zoom) as f64 - 1.0;
    let top_left = vp.top_left();
    let index = |px: f64| (px / TILE_SIZE).floor().clamp(0.0, max_index) as u32;
    let x0 = index(top_left.x);
    let x1 = index(top_left.x + vp.width - 1.0);
    let y0 = index(top_left.y);
    let y1 = index(top_left.y + vp.height - 1.0);

    let mut tiles: Vec<TileKey> = (y0..=y1)
        .flat_map(|y| (x0..=x1).map(move |x| TileKey { z: vp.zoom, x, y }))
        .collect();

    let distance_sq = |key: &TileKey| {
        let cx = (key.x as f64 + 0.5) * TILE_SIZE - vp.center_px.x;
        let cy = (key.y as f64 + 0.5) * TILE_SIZE - vp.center_px.y;
        cx * cx + cy * cy
    };
    tiles.sort_by(|a, b| {
        distance_sq(a)
            .total_cmp(&distance_sq(b))
            .then_with(|| a.cmp(b))
    });
    tiles
}

pub fn tile_url(template: &str, key: TileKey) -> String {
    let subdomain = SUBDOMAINS[((key.x as u64 + key.y as u64) % SUBDOMAINS.len() as u64) as usize];
    template
        .replace("{s}", subdomain)
        .replace("{z}", &key.z.to_string())
        .replace("{x}", &key.x.to_string())
        .replace("{y}", &key.y.to_string())
}

enum TileSlot {
    Queued,
    Loading,
    Ready(HtmlImageElement),
    Failed,
}

/// Pick cached keys to drop once the cache is over `cap`: anything not
/// currently wanted, farthest zoom level first.
fn eviction_order(cached: &[TileKey], wanted: &[TileKey], zoom: u8, cap: usize) -> Vec<TileKey> {
    if cached.len() <= cap {
        return Vec::new();
    }
    let mut candidates: Vec<TileKey> = cached
        .iter()
        .filter(|key| !wanted.contains(key))
        .copied()
        .collect();
    candidates.sort_by_key(|key| std::cmp::Reverse((key.z as i32 - zoom as i32).abs()));
    candidates.truncate(cached.len() - cap);
    candidates
}

/// Raster tile cache with a bounded-concurrency load queue.
#[derive(Clone)]
pub struct TileLoader {
    inner: Rc<LoaderInner>,
}

struct LoaderInner {
    template: String,
    slots: RefCell<HashMap<TileKey, TileSlot>>,
    queue: RefCell<VecDeque<TileKey>>,
    in_flight: Cell<usize>,
    on_ready: Box<dyn Fn()>,
}

impl TileLoader {
    pub fn new(template: impl Into<String>, on_ready: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(LoaderInner {
                template: template.into(),
                slots: RefCell::new(HashMap::new()),
                queue: RefCell::new(VecDeque::new()),
                in_flight: Cell::new(0),
                on_ready: Box::new(on_ready),
            }),
        }
    }

    /// Replace the pending queue with `wanted` (already priority ordered).
    /// Tiles that scrolled away before their request started are dropped.
    pub fn request(&self, wanted: &[TileKey], zoom: u8) {
        {
            let mut slots = self.inner.slots.borrow_mut();
            let mut queue = self.inner.queue.borrow_mut();
            for stale in queue.drain(..) {
                if !wanted.contains(&stale) {
                    slots.remove(&stale);
                }
            }
            for key in wanted {
                match slots.get(key) {
                    None | Some(TileSlot::Queued) => {
                        slots.insert(*key, TileSlot::Queued);
                        queue.push_back(*key);
                    }
                    _ => {}
                }
            }

            let cached: Vec<TileKey> = slots
                .iter()
                .filter(|(_, slot)| matches!(slot, TileSlot::Ready(_) | TileSlot::Failed))
                .map(|(key, _)| *key)
                .collect();
            for key in eviction_order(&cached, wanted, zoom, MAX_CACHED_TILES) {
                slots.remove(&key);
            }
        }
        pump_queue(&self.inner);
    }

    pub fn image(&self, key: TileKey) -> Option<HtmlImageElement> {
        match self.inner.slots.borrow().get(&key) {
            Some(TileSlot::Ready(image)) => Some(image.clone()),
            _ => None,
        }
    }
}

fn pump_queue(inner: &Rc<LoaderInner>) {
    while inner.in_flight.get() < MAX_CONCURRENCY {
        let Some(key) = inner.queue.borrow_mut().pop_front() else {
            break;
        };
        inner.slots.borrow_mut().insert(key, TileSlot::Loading);
        inner.in_flight.set(inner.in_flight.get() + 1);
        load_tile(inner, key);
    }
}

fn finish_tile(inner: &Rc<LoaderInner>, key: TileKey, slot: TileSlot) {
    inner.in_flight.set(inner.in_flight.get().saturating_sub(1));
    let ready = matches!(slot, TileSlot::Ready(_));
    inner.slots.borrow_mut().insert(key, slot);
    if ready {
        (inner.on_ready)();
    }
    pump_queue(inner);
}

fn load_tile(inner: &Rc<LoaderInner>, key: TileKey) {
    let img = match HtmlImageElement::new() {
        Ok(img) => img,
        Err(_) => {
            finish_tile(inner, key, TileSlot::Failed);
            return;
        }
    };
    img.set_cross_origin(Some("anonymous"));

    let img_for_load = img.clone();
    let inner_load = inner.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);
        finish_tile(&inner_load, key, TileSlot::Ready(img_for_load.clone()));
    });

    let img_for_error = img.clone();
    let inner_error = inner.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        tracing::debug!(z = key.z, x = key.x, y = key.y, "tile failed to load");
        finish_tile(&inner_error, key, TileSlot::Failed);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(&tile_url(&inner.template, key));
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::INITIAL_CENTER;
    use hotspot_shared::GeoPoint;

    #[test]
    fn visible_tiles_cover_viewport() {
        let vp = Viewport::new(INITIAL_CENTER, 8, 800.0, 600.0);
        let tiles = visible_tiles(&vp);
        let xs: Vec<u32> = tiles.iter().map(|t| t.x).collect();
        let ys: Vec<u32> = tiles.iter().map(|t| t.y).collect();
        let top_left = vp.top_left();
        assert_eq!(*xs.iter().min().expect("tiles"), (top_left.x / 256.0) as u32);
        assert_eq!(
            *xs.iter().max().expect("tiles"),
            ((top_left.x + 799.0) / 256.0) as u32
        );
        assert_eq!(*ys.iter().min().expect("tiles"), (top_left.y / 256.0) as u32);
        assert!(tiles.iter().all(|t| t.z == 8));
    }

    #[test]
    fn nearest_tile_comes_first() {
        let vp = Viewport::new(INITIAL_CENTER, 8, 800.0, 600.0);
        let first = visible_tiles(&vp)[0];
        let center_tile_x = (vp.center_px.x / 256.0).floor() as u32;
        let center_tile_y = (vp.center_px.y / 256.0).floor() as u32;
        assert_eq!((first.x, first.y), (center_tile_x, center_tile_y));
    }

    #[test]
    fn world_edges_are_clamped() {
        let vp = Viewport::new(GeoPoint::new(0.0, 0.0), 0, 1000.0, 1000.0);
        assert_eq!(visible_tiles(&vp), vec![TileKey { z: 0, x: 0, y: 0 }]);
        let empty = Viewport::new(INITIAL_CENTER, 8, 0.0, 600.0);
        assert!(visible_tiles(&empty).is_empty());
    }

    #[test]
    fn url_template_substitution() {
        let key = TileKey { z: 8, x: 139, y: 89 };
        assert_eq!(
            tile_url("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", key),
            "https://a.tile.openstreetmap.org/8/139/89.png"
        );
        assert_eq!(tile_url("/t/{z}/{x}/{y}", key), "/t/8/139/89");
    }

    #[test]
    fn parent_tile() {
        let key = TileKey { z: 9, x: 279, y: 178 };
        assert_eq!(key.parent(), Some(TileKey { z: 8, x: 139, y: 89 }));
        assert_eq!(TileKey { z: 0, x: 0, y: 0 }.parent(), None);
    }

    #[test]
    fn eviction_prefers_distant_zoom_levels() {
        let wanted = [TileKey { z: 8, x: 1, y: 1 }];
        let cached = [
            TileKey { z: 8, x: 1, y: 1 },
            TileKey { z: 7, x: 0, y: 0 },
            TileKey { z: 3, x: 0, y: 0 },
            TileKey { z: 8, x: 2, y: 1 },
        ];
        assert!(eviction_order(&cached, &wanted, 8, 4).is_empty());
        let evicted = eviction_order(&cached, &wanted, 8, 2);
        assert_eq!(
            evicted,
            vec![TileKey { z: 3, x: 0, y: 0 }, TileKey { z: 7, x: 0, y: 0 }]
        );
    }
}
