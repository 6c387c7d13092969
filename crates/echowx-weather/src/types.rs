use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// One named forecast period ("Tonight", "Wednesday", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub name: String,
    pub detailed_forecast: String,
}

/// CAP severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Extreme,
    #[default]
    #[serde(other)]
    Unknown,
}

/// An active hazard alert for a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: String,
    pub headline: String,
    pub description: String,
    pub event: String,
    pub severity: Severity,
    /// Outer ring of the alert area in provider order: (longitude, latitude).
    pub polygon: Option<Vec<(f64, f64)>>,
    pub sender_name: String,
}

impl Alert {
    /// Warning-tier alert: the event names a warning and not a watch.
    pub fn is_warning(&self) -> bool {
        crate::classify::is_warning(&self.event)
    }
}

/// Administrative location of a point and links to its resources.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMetadata {
    pub city: String,
    pub state: String,
    pub observation_stations_url: String,
    pub forecast_url: String,
}

impl PointMetadata {
    /// Header text, e.g. "Wichita, KS".
    pub fn place_name(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// Latest observation at the nearest station.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    /// Heat index, else wind chill, when the station reports one.
    pub feels_like_c: Option<f64>,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl CurrentConditions {
    /// Feels-like value worth showing: omitted when it matches the actual
    /// temperature.
    pub fn displayed_feels_like(&self) -> Option<f64> {
        match (self.feels_like_c, self.temperature_c) {
            (Some(feels), Some(actual)) if feels == actual => None,
            (feels, _) => feels,
        }
    }
}

/// Newest radar composite confirmed to be servable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadarFrame {
    pub timestamp: i64,
}

impl RadarFrame {
    /// Slippy-map template for this frame's tiles.
    pub fn tile_url(&self, tile_base_url: &str) -> String {
        format!(
            "{}/v2/radar/{}/256/{{z}}/{{x}}/{{y}}/2/1_1.png",
            tile_base_url.trim_end_matches('/'),
            self.timestamp
        )
    }

    /// Fixed tile used to check that the frame is actually served.
    pub fn probe_url(&self, tile_base_url: &str) -> String {
        format!(
            "{}/v2/radar/{}/256/4/3/5/2/1_1.png",
            tile_base_url.trim_end_matches('/'),
            self.timestamp
        )
    }
}

/// Celsius to Fahrenheit.
pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Fahrenheit to Celsius.
pub fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Display form of a Celsius reading, e.g. "77°F".
pub fn format_fahrenheit(celsius: f64) -> String {
    format!("{}°F", c_to_f(celsius).round() as i64)
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No observation stations found")]
    NoStationFound,
    #[error("No radar frame available")]
    NoRadarFrameAvailable,
    #[error("No results for '{0}'")]
    GeocodeNotFound(String),
}
