use hotspot_shared::ActivityLevel;
use leptos::prelude::*;
use web_sys::HtmlImageElement;

/// Decoded activity icons, drawn above each hotspot circle. A slot stays
/// empty when its image failed to load; the overlay then skips the icon.
#[derive(Clone, Default)]
pub struct ActivityIcons {
    images: [Option<HtmlImageElement>; 3],
}

pub fn icon_slot(level: ActivityLevel) -> usize {
    match level {
        ActivityLevel::Rest => 0,
        ActivityLevel::LowActivity => 1,
        ActivityLevel::Active => 2,
    }
}

impl ActivityIcons {
    pub fn get(&self, level: ActivityLevel) -> Option<&HtmlImageElement> {
        self.images[icon_slot(level)].as_ref()
    }
}

async fn decode_icon(src: &str) -> Result<HtmlImageElement, String> {
    let image = HtmlImageElement::new().map_err(|e| format!("create image: {e:?}"))?;
    image.set_src(src);
    wasm_bindgen_futures::JsFuture::from(image.decode())
        .await
        .map_err(|e| format!("decode {src}: {e:?}"))?;
    Ok(image)
}

/// Load all three icons, publishing once every request has finished.
pub fn load_activity_icons(signal: RwSignal<ActivityIcons>) {
    wasm_bindgen_futures::spawn_local(async move {
        let mut icons = ActivityIcons::default();
        for level in ActivityLevel::ALL {
            match decode_icon(level.icon_src()).await {
                Ok(image) => icons.images[icon_slot(level)] = Some(image),
                Err(err) => tracing::warn!(level = level.label(), %err, "activity icon unavailable"),
            }
        }
        signal.set(icons);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_its_own_slot() {
        let slots: Vec<usize> = ActivityLevel::ALL.iter().map(|&l| icon_slot(l)).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn empty_icons_yield_nothing() {
        let icons = ActivityIcons::default();
        assert!(icons.get(ActivityLevel::Active).is_none());
    }
}
