use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{LoadError, RecordError};
use crate::hotspot::{ActivityLevel, DailyStay, GeoPoint, Hotspot, VisualizationModel};

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawCoordinate {
    longitude: f64,
    latitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDailyStay {
    date: String,
    stay_duration_in_minutes: f64,
}

/// One cluster record as written by the upstream analytics export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHotspot {
    #[serde(default)]
    positions: Vec<RawCoordinate>,
    #[serde(default)]
    centroid: Option<RawCoordinate>,
    minutes_spent_in_cluster: f64,
    /// Some exporters write every number as a float, so `2.0` is accepted.
    dominant_activity_level: f64,
    #[serde(default)]
    time_statistics: Vec<RawDailyStay>,
}

/// Parse the dataset document into a sorted [`VisualizationModel`].
///
/// Only a document that is not a JSON array fails the load. Individual
/// records that are malformed are logged and skipped.
pub fn parse_dataset(payload: &str) -> Result<VisualizationModel, LoadError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let serde_json::Value::Array(records) = value else {
        return Err(LoadError::NotAnArray);
    };

    let total = records.len();
    let mut hotspots = Vec::with_capacity(total);
    let mut skipped = 0usize;
    for (index, record) in records.into_iter().enumerate() {
        match hotspot_from_record(record) {
            Ok(hotspot) => hotspots.push(hotspot),
            Err(e) => {
                skipped += 1;
                tracing::warn!(index, error = %e, "skipping malformed hotspot record");
            }
        }
    }

    tracing::info!(total, loaded = hotspots.len(), skipped, "dataset parsed");
    Ok(VisualizationModel::new(hotspots, skipped))
}

fn hotspot_from_record(record: serde_json::Value) -> Result<Hotspot, RecordError> {
    let raw: RawHotspot =
        serde_json::from_value(record).map_err(|e| RecordError::Schema(e.to_string()))?;

    // Precomputed centroid wins over the first raw sample.
    let coordinate = raw
        .centroid
        .or_else(|| raw.positions.first().copied())
        .ok_or(RecordError::MissingCoordinate)?;
    let position = GeoPoint::new(coordinate.latitude, coordinate.longitude);
    if !position.is_valid() {
        return Err(RecordError::CoordinateOutOfRange {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        });
    }

    let stay_duration_minutes = validate_minutes(raw.minutes_spent_in_cluster)?;
    let dominant_activity_level = activity_level(raw.dominant_activity_level)?;

    if raw.time_statistics.is_empty() {
        return Err(RecordError::EmptyTimeStatistics);
    }
    let mut time_statistics = raw
        .time_statistics
        .into_iter()
        .map(|entry| {
            Ok(DailyStay {
                date: parse_date(&entry.date)?,
                stay_duration_minutes: validate_minutes(entry.stay_duration_in_minutes)?,
            })
        })
        .collect::<Result<Vec<_>, RecordError>>()?;
    time_statistics.sort_by_key(|s| s.date);

    Ok(Hotspot {
        position,
        stay_duration_minutes,
        dominant_activity_level,
        time_statistics,
    })
}

fn validate_minutes(minutes: f64) -> Result<f64, RecordError> {
    if minutes.is_finite() && minutes >= 0.0 {
        Ok(minutes)
    } else {
        Err(RecordError::InvalidDuration(minutes))
    }
}

fn activity_level(code: f64) -> Result<ActivityLevel, RecordError> {
    let whole = code.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&code);
    whole
        .then(|| ActivityLevel::from_code(code as u8))
        .flatten()
        .ok_or(RecordError::UnknownActivityLevel(code))
}

/// Accepts a plain ISO date, an RFC 3339 timestamp, or a local ISO
/// date-time without offset. Only the calendar date is kept.
pub fn parse_date(raw: &str) -> Result<NaiveDate, RecordError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .map_err(|_| RecordError::InvalidDate(raw.to_string()))
}
