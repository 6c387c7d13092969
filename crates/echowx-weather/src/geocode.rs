//! Forward geocoding: free-text place search via Nominatim (OpenStreetMap).
//! Free, no API key required.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::types::{Location, WeatherError};

/// One candidate match, already converted to numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

impl GeocodeResult {
    pub fn location(&self) -> Location {
        Location::new(self.lat, self.lon)
    }
}

/// Place search backend.
#[async_trait]
pub trait GeocodeSource: Send + Sync {
    /// Candidates in provider relevance order. An empty list is not an error.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Arc<Client>,
    search_url: String,
}

impl Geocoder {
    pub fn new(
        search_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            search_url: search_url.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[async_trait]
impl GeocodeSource for Geocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, WeatherError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("format", "json"), ("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                url: self.search_url.clone(),
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("geocode results: {}", e)))?;

        places
            .into_iter()
            .map(|p| -> Result<GeocodeResult, WeatherError> {
                let lat = p
                    .lat
                    .parse::<f64>()
                    .map_err(|e| WeatherError::Parse(format!("lat '{}': {}", p.lat, e)))?;
                let lon = p
                    .lon
                    .parse::<f64>()
                    .map_err(|e| WeatherError::Parse(format!("lon '{}': {}", p.lon, e)))?;
                Ok(GeocodeResult {
                    lat,
                    lon,
                    display_name: p.display_name,
                })
            })
            .collect()
    }
}

/// Resolve a free-text query to one location.
///
/// `GeocodeNotFound` for an empty query or no results; transport and parse
/// failures pass through unchanged.
pub async fn resolve(source: &dyn GeocodeSource, query: &str) -> Result<Location, WeatherError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(WeatherError::GeocodeNotFound(String::new()));
    }

    let results = source.search(query).await?;
    let best = pick_best(query, &results)
        .ok_or_else(|| WeatherError::GeocodeNotFound(query.to_string()))?;

    tracing::info!("Geocoded '{}' to {}", query, best.display_name);
    Ok(best.location())
}

/// Choose among candidates. A query ending in ", XX" (two uppercase letters)
/// prefers the first result naming that state, by code or by full name.
/// Otherwise, or when nothing names the state, the first result.
pub fn pick_best<'a>(query: &str, results: &'a [GeocodeResult]) -> Option<&'a GeocodeResult> {
    let first = results.first()?;

    let Some(code) = state_suffix(query) else {
        return Some(first);
    };

    let with_comma = format!(", {},", code);
    let trailing = format!(", {}", code);
    let state_name = us_state_name(code).map(|name| format!(", {}", name));

    let preferred = results.iter().find(|r| {
        let name = r.display_name.as_str();
        name.contains(&with_comma)
            || name.ends_with(&trailing)
            || state_name
                .as_deref()
                .is_some_and(|s| name.contains(&format!("{},", s)) || name.ends_with(s))
    });

    Some(preferred.unwrap_or(first))
}

/// Two-letter uppercase code after the last ", " of the query.
fn state_suffix(query: &str) -> Option<&str> {
    let (_, code) = query.trim_end().rsplit_once(", ")?;
    let is_code = code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase());
    is_code.then_some(code)
}

const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

fn us_state_name(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
