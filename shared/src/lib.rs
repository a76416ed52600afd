pub mod chart;
pub mod colors;
pub mod config;
pub mod dataset;
pub mod duration_format;
pub mod error;
pub mod hotspot;
pub mod layout;
pub mod legend;
pub mod projection;

pub use colors::{LinearColorScale, Rgb};
pub use config::{OverlayConfig, Preset};
pub use dataset::parse_dataset;
pub use error::{LoadError, RecordError};
pub use hotspot::*;
pub use layout::{DetailTransition, OverlayGroup, RenderContext, ViewportChange};
pub use projection::{MapProjection, ScreenPoint};
