//! RainViewer radar frame discovery.
//!
//! The published frame index can list timestamps whose tiles are not yet
//! (or no longer) served, so each candidate is probed with a HEAD request
//! before it is handed out.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{RadarFrame, WeatherError};

/// Tile layer options for radar imagery.
pub const RADAR_MAX_ZOOM: u8 = 12;
pub const RADAR_ATTRIBUTION: &str = "Radar © RainViewer.com";

#[derive(Debug, Clone)]
pub struct RadarClient {
    client: Arc<Client>,
    index_url: String,
    tile_base_url: String,
}

impl RadarClient {
    pub fn new(
        index_url: &str,
        tile_base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            index_url: index_url.to_string(),
            tile_base_url: tile_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn tile_base_url(&self) -> &str {
        &self.tile_base_url
    }

    /// Newest frame whose sample tile answers a HEAD probe. `None` when the
    /// index cannot be read or no frame passes; callers keep their current
    /// layer in that case.
    pub async fn resolve_latest_frame(&self) -> Option<RadarFrame> {
        match self.try_resolve().await {
            Ok(frame) => Some(frame),
            Err(WeatherError::NoRadarFrameAvailable) => {
                tracing::warn!("No working radar frame found");
                None
            }
            Err(e) => {
                tracing::error!("Error loading radar frames: {}", e);
                None
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn try_resolve(&self) -> Result<RadarFrame, WeatherError> {
        let response = self.client.get(&self.index_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                url: self.index_url.clone(),
            });
        }
        let index: FrameIndex = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("radar index: {}", e)))?;

        // Index is oldest first.
        for entry in index.radar.past.iter().rev() {
            let frame = RadarFrame {
                timestamp: entry.time,
            };
            if self.probe(&frame).await {
                tracing::debug!("Radar frame {} is servable", frame.timestamp);
                return Ok(frame);
            }
        }

        Err(WeatherError::NoRadarFrameAvailable)
    }

    /// A transport failure counts as a failed probe; the next older frame
    /// is tried.
    async fn probe(&self, frame: &RadarFrame) -> bool {
        let url = frame.probe_url(&self.tile_base_url);
        match self.client.head(&url).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    tracing::debug!("Probe {} returned {}", url, response.status());
                }
                response.status().is_success()
            }
            Err(e) => {
                tracing::debug!("Probe {} failed: {}", url, e);
                false
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrameIndex {
    radar: RadarFrames,
}

#[derive(Debug, Deserialize)]
struct RadarFrames {
    #[serde(default)]
    past: Vec<FrameEntry>,
}

#[derive(Debug, Deserialize)]
struct FrameEntry {
    time: i64,
}
