mod app;
mod canvas;
mod config;
mod icons;
mod legend;
mod loader;
mod logging;
mod overlay;
mod render_loop;
mod tiles;
mod viewport;

use leptos::mount::mount_to;
use leptos::prelude::*;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use crate::app::App;
use crate::config::ClientConfig;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let config = ClientConfig::from_location();
    logging::init(config.log_level);

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let mount_target = document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body());
    let Some(target) = mount_target else {
        tracing::error!("no mount target");
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // Re-entered main (hot reload): drop the old mount first so its
        // effects stop touching shared state.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, move || view! { <App config=config /> });
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
