use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Dominant activity level of a hotspot, encoded upstream as 0/1/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityLevel {
    Rest,
    LowActivity,
    Active,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 3] = [
        ActivityLevel::Rest,
        ActivityLevel::LowActivity,
        ActivityLevel::Active,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Rest),
            1 => Some(Self::LowActivity),
            2 => Some(Self::Active),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rest => "Rest",
            Self::LowActivity => "Low activity",
            Self::Active => "Active",
        }
    }

    pub fn icon_src(self) -> &'static str {
        match self {
            Self::Rest => "/icons/rest.svg",
            Self::LowActivity => "/icons/low-activity.svg",
            Self::Active => "/icons/active.svg",
        }
    }
}

/// Minutes spent in a cluster on one observation day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyStay {
    pub date: NaiveDate,
    pub stay_duration_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub position: GeoPoint,
    pub stay_duration_minutes: f64,
    pub dominant_activity_level: ActivityLevel,
    /// Chronologically ordered, never empty.
    pub time_statistics: Vec<DailyStay>,
}

impl Hotspot {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.time_statistics.first().map(|s| s.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.time_statistics.last().map(|s| s.date)
    }
}

/// Position of a hotspot inside a [`VisualizationModel`]. Stable for the
/// lifetime of the model since hotspots are never added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotspotId(pub usize);

/// All hotspots of one render session, sorted ascending by stay duration so
/// the longest stays paint last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualizationModel {
    hotspots: Vec<Hotspot>,
    skipped_records: usize,
}

impl VisualizationModel {
    pub fn new(mut hotspots: Vec<Hotspot>, skipped_records: usize) -> Self {
        hotspots.sort_by(|a, b| a.stay_duration_minutes.total_cmp(&b.stay_duration_minutes));
        Self {
            hotspots,
            skipped_records,
        }
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HotspotId, &Hotspot)> {
        self.hotspots
            .iter()
            .enumerate()
            .map(|(idx, h)| (HotspotId(idx), h))
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    /// Number of input records dropped as malformed during load.
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn max_stay_minutes(&self) -> f64 {
        self.hotspots
            .last()
            .map(|h| h.stay_duration_minutes)
            .unwrap_or(0.0)
    }

    /// Earliest and latest observation day across every hotspot.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.hotspots.iter().filter_map(Hotspot::first_date).min()?;
        let last = self.hotspots.iter().filter_map(Hotspot::last_date).max()?;
        Some((first, last))
    }
}
