//! Periodic radar layer refresh, independent of selections.

use std::sync::Arc;
use std::time::Duration;

use echowx_weather::RadarClient;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::overlay::MapOverlayManager;

#[derive(Debug, Clone)]
pub struct RadarRefresh {
    radar: RadarClient,
    overlay: Arc<Mutex<MapOverlayManager>>,
    opacity: f32,
}

impl RadarRefresh {
    pub fn new(radar: RadarClient, overlay: Arc<Mutex<MapOverlayManager>>, opacity: f32) -> Self {
        Self {
            radar,
            overlay,
            opacity,
        }
    }

    /// Resolve the newest frame and swap it in. Returns whether the layer
    /// changed; on failure the current layer stays.
    pub async fn refresh_once(&self) -> bool {
        let Some(frame) = self.radar.resolve_latest_frame().await else {
            return false;
        };
        self.overlay
            .lock()
            .replace_radar(frame, self.radar.tile_base_url(), self.opacity);
        true
    }

    /// Refresh now and then every `interval` until `cancel` fires.
    pub fn spawn(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Radar refresh stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.refresh_once().await;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{HeadlessMap, Layer};
    use echowx_weather::Location;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn radar_server(ts: i64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/weather-maps.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "radar": {"past": [{"time": ts}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path(format!("/v2/radar/{}/256/4/3/5/2/1_1.png", ts)))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        server
    }

    fn refresh(server: &MockServer, map: &HeadlessMap) -> RadarRefresh {
        let radar = RadarClient::new(
            &format!("{}/public/weather-maps.json", server.uri()),
            &server.uri(),
            "echowx-test",
            Duration::from_secs(5),
        )
        .unwrap();
        let overlay = Arc::new(Mutex::new(MapOverlayManager::new(Box::new(map.clone()), false)));
        RadarRefresh::new(radar, overlay, 0.6)
    }

    fn tile_count(map: &HeadlessMap) -> usize {
        map.count_layers(|l| matches!(l, Layer::Tile { .. }))
    }

    #[tokio::test]
    async fn test_refresh_once_adds_single_tile_layer() {
        let server = radar_server(1_700_000_000).await;
        let map = HeadlessMap::new(Location::new(39.5, -98.35), 4);
        let refresh = refresh(&server, &map);

        assert!(refresh.refresh_once().await);
        assert!(refresh.refresh_once().await);
        assert_eq!(tile_count(&map), 1);

        match &map.layers()[0].1 {
            Layer::Tile {
                opacity,
                max_zoom,
                attribution,
                ..
            } => {
                assert_eq!(*opacity, 0.6);
                assert_eq!(*max_zoom, 12);
                assert!(attribution.contains("RainViewer"));
            }
            other => panic!("unexpected layer {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_layer() {
        let good = radar_server(100).await;
        let map = HeadlessMap::new(Location::new(39.5, -98.35), 4);
        assert!(refresh(&good, &map).refresh_once().await);

        let empty = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/weather-maps.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&empty)
            .await;

        assert!(!refresh(&empty, &map).refresh_once().await);
        assert_eq!(tile_count(&map), 1);
    }

    #[tokio::test]
    async fn test_loop_stops_on_cancel() {
        let server = radar_server(100).await;
        let map = HeadlessMap::new(Location::new(39.5, -98.35), 4);
        let cancel = CancellationToken::new();

        let handle = refresh(&server, &map).spawn(Duration::from_secs(300), cancel.clone());
        cancel.cancel();
        handle.await.unwrap();
    }
}
