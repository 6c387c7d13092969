//! api.weather.gov client: point metadata, forecast periods, active alerts
//! and station observations.
//!
//! Response bodies are decoded into explicit schemas; a body that does not
//! match is a `Parse` error rather than a silently empty value.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{
    Alert, CurrentConditions, ForecastPeriod, Location, PointMetadata, Severity, WeatherError,
};

/// Weather data for a point. Implemented by `NwsClient`; test code swaps in
/// canned sources.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn point_metadata(&self, location: Location) -> Result<PointMetadata, WeatherError>;

    /// Forecast periods in chronological order; empty on failure.
    async fn forecast(&self, location: Location) -> Vec<ForecastPeriod>;

    /// Alerts intersecting the point; empty on failure.
    async fn active_alerts(&self, location: Location) -> Vec<Alert>;

    async fn current_conditions(
        &self,
        observation_stations_url: &str,
    ) -> Result<CurrentConditions, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct NwsClient {
    client: Arc<Client>,
    base_url: String,
}

impl NwsClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the provider's "point" resource for a location.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_point_metadata(
        &self,
        location: Location,
    ) -> Result<PointMetadata, WeatherError> {
        let url = format!(
            "{}/points/{},{}",
            self.base_url,
            format_coord(location.lat),
            format_coord(location.lng)
        );
        let body: PointsResponse = self.get_json(&url).await?;
        let props = body.properties;

        Ok(PointMetadata {
            city: props.relative_location.properties.city,
            state: props.relative_location.properties.state,
            observation_stations_url: props.observation_stations,
            forecast_url: props.forecast,
        })
    }

    /// Point metadata, then the linked forecast. Never fails: errors are
    /// logged and yield an empty list.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_forecast(&self, location: Location) -> Vec<ForecastPeriod> {
        match self.try_fetch_forecast(location).await {
            Ok(periods) => periods,
            Err(e) => {
                tracing::error!("Error fetching forecast for {}: {}", location, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_forecast(
        &self,
        location: Location,
    ) -> Result<Vec<ForecastPeriod>, WeatherError> {
        let point = self.fetch_point_metadata(location).await?;
        let body: ForecastResponse = self.get_json(&point.forecast_url).await?;

        Ok(body
            .properties
            .periods
            .into_iter()
            .map(|p| ForecastPeriod {
                name: p.name,
                detailed_forecast: p.detailed_forecast,
            })
            .collect())
    }

    /// Active alerts intersecting the point; empty on failure.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_active_alerts(&self, location: Location) -> Vec<Alert> {
        match self.try_fetch_active_alerts(location).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::error!("Error fetching alerts for {}: {}", location, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_active_alerts(
        &self,
        location: Location,
    ) -> Result<Vec<Alert>, WeatherError> {
        let url = format!(
            "{}/alerts/active?point={},{}",
            self.base_url,
            format_coord(location.lat),
            format_coord(location.lng)
        );
        let body: AlertCollection = self.get_json(&url).await?;
        Ok(body.features.into_iter().map(AlertFeature::into_alert).collect())
    }

    /// Latest observation from the first station in the list. No fallback
    /// to later stations.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_current_conditions(
        &self,
        observation_stations_url: &str,
    ) -> Result<CurrentConditions, WeatherError> {
        let stations: StationCollection = self.get_json(observation_stations_url).await?;
        let station = stations
            .features
            .into_iter()
            .next()
            .ok_or(WeatherError::NoStationFound)?;

        let url = format!("{}/observations/latest", station.id.trim_end_matches('/'));
        let body: ObservationResponse = self.get_json(&url).await?;
        let props = body.properties;

        tracing::debug!(
            "Temp: {:?}, heat index: {:?}, wind chill: {:?}",
            props.temperature.value,
            props.heat_index.as_ref().and_then(|q| q.value),
            props.wind_chill.as_ref().and_then(|q| q.value)
        );

        let feels_like_c = props
            .heat_index
            .and_then(|q| q.value)
            .or_else(|| props.wind_chill.and_then(|q| q.value));

        let timestamp = match props.timestamp {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| WeatherError::Parse(format!("observation timestamp: {}", e)))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(CurrentConditions {
            temperature_c: props.temperature.value,
            feels_like_c,
            description: props.text_description.unwrap_or_default(),
            timestamp,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/geo+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl WeatherSource for NwsClient {
    async fn point_metadata(&self, location: Location) -> Result<PointMetadata, WeatherError> {
        self.fetch_point_metadata(location).await
    }

    async fn forecast(&self, location: Location) -> Vec<ForecastPeriod> {
        self.fetch_forecast(location).await
    }

    async fn active_alerts(&self, location: Location) -> Vec<Alert> {
        self.fetch_active_alerts(location).await
    }

    async fn current_conditions(
        &self,
        observation_stations_url: &str,
    ) -> Result<CurrentConditions, WeatherError> {
        self.fetch_current_conditions(observation_stations_url).await
    }
}

/// Shortest decimal form with at most four places; the API redirects
/// anything more precise.
fn format_coord(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

// ---- wire schemas ----

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    forecast: String,
    observation_stations: String,
    relative_location: RelativeLocation,
}

#[derive(Debug, Deserialize)]
struct RelativeLocation {
    properties: RelativeLocationProperties,
}

#[derive(Debug, Deserialize)]
struct RelativeLocationProperties {
    city: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<RawPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriod {
    name: String,
    detailed_forecast: String,
}

#[derive(Debug, Deserialize)]
struct AlertCollection {
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertProperties {
    id: String,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    description: Option<String>,
    event: String,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    sender_name: Option<String>,
}

impl AlertFeature {
    fn into_alert(self) -> Alert {
        let polygon = self.geometry.and_then(RawGeometry::outer_ring);
        let props = self.properties;

        Alert {
            id: props.id,
            headline: props.headline.unwrap_or_else(|| props.event.clone()),
            description: props.description.unwrap_or_default(),
            event: props.event,
            severity: props.severity,
            polygon,
            sender_name: props.sender_name.unwrap_or_default(),
        }
    }
}

impl RawGeometry {
    /// Outer ring of a `Polygon` geometry; anything else carries no polygon.
    fn outer_ring(self) -> Option<Vec<(f64, f64)>> {
        if self.kind != "Polygon" {
            return None;
        }
        let rings: Vec<Vec<[f64; 2]>> = match serde_json::from_value(self.coordinates) {
            Ok(rings) => rings,
            Err(e) => {
                tracing::warn!("Ignoring malformed alert polygon: {}", e);
                return None;
            }
        };
        let ring = rings.into_iter().next()?;
        if ring.is_empty() {
            return None;
        }
        Some(ring.into_iter().map(|[lon, lat]| (lon, lat)).collect())
    }
}

#[derive(Debug, Deserialize)]
struct StationCollection {
    features: Vec<StationFeature>,
}

#[derive(Debug, Deserialize)]
struct StationFeature {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ObservationResponse {
    properties: ObservationProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    temperature: QuantitativeValue,
    #[serde(default)]
    heat_index: Option<QuantitativeValue>,
    #[serde(default)]
    wind_chill: Option<QuantitativeValue>,
    #[serde(default)]
    text_description: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuantitativeValue {
    value: Option<f64>,
}
