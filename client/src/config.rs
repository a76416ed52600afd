use hotspot_shared::{OverlayConfig, Preset};
use tracing::Level;

pub const DEFAULT_DATASET_URL: &str = "data/positions.json";
pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "Map data © OpenStreetMap contributors";
pub const SETTLE_DELAY_MS: u32 = 150;
pub const DEFAULT_LOG_LEVEL: Level = Level::INFO;

/// Page-level settings. Overrides come from the query string
/// (`?preset=daily&threshold=12&data=...&log=debug`); anything missing or
/// unparsable keeps its default.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub overlay: OverlayConfig,
    pub dataset_url: String,
    pub log_level: Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl ClientConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let preset = lookup("preset")
            .and_then(|value| Preset::from_name(&value))
            .unwrap_or(Preset::Classic);
        let mut overlay = OverlayConfig::preset(preset);
        let threshold = lookup("threshold").and_then(|value| value.trim().parse::<u8>().ok());
        if let Some(threshold) = threshold {
            overlay = overlay.with_detail_threshold(threshold);
        }

        let dataset_url = lookup("data")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATASET_URL.to_string());

        let log_level = lookup("log")
            .and_then(|value| value.trim().parse::<Level>().ok())
            .unwrap_or(DEFAULT_LOG_LEVEL);

        Self {
            overlay,
            dataset_url,
            log_level,
        }
    }

    /// Read overrides from the current page URL.
    pub fn from_location() -> Self {
        let params = web_sys::window()
            .and_then(|window| window.location().search().ok())
            .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok());
        match params {
            Some(params) => Self::from_lookup(|key| params.get(key)),
            None => Self::default(),
        }
    }
}
