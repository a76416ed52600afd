use thiserror::Error;

/// Failure to produce a [`crate::VisualizationModel`]. Terminal for the page
/// load: nothing retries.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("HTTP {0}")]
    Http(u16),
    #[error("parse error: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("dataset is not a JSON array")]
    NotAnArray,
}

/// Why a single dataset record was dropped.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("record does not match the hotspot schema: {0}")]
    Schema(String),
    #[error("record has no coordinate")]
    MissingCoordinate,
    #[error("coordinate out of range: lat {latitude}, lon {longitude}")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },
    #[error("record has no time statistics")]
    EmptyTimeStatistics,
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("invalid duration {0}")]
    InvalidDuration(f64),
    #[error("unknown activity level {0}")]
    UnknownActivityLevel(f64),
}
