//! Application wiring: builds clients from configuration and owns the
//! background radar task.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use echowx_core::Config;
use echowx_services::{FavoriteStore, JsonFavoriteStore};
use echowx_weather::{Geocoder, Location, NwsClient, RadarClient};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::controller::{ControllerOptions, SelectionController};
use crate::favorites::FavoritesModel;
use crate::map::MapSurface;
use crate::overlay::MapOverlayManager;
use crate::radar_refresh::RadarRefresh;

pub struct EchoWxApp {
    config: Config,
    controller: Arc<SelectionController>,
    favorites: FavoritesModel,
    radar: RadarRefresh,
    shutdown: CancellationToken,
    radar_task: Option<JoinHandle<()>>,
}

impl EchoWxApp {
    pub fn new(config: Config, map: Box<dyn MapSurface>) -> Result<Self> {
        let timeout = Duration::from_secs(config.weather.request_timeout_secs);
        let user_agent = config.weather.user_agent.as_str();

        let nws = NwsClient::new(&config.weather.api_base_url, user_agent, timeout)
            .context("Failed to create weather client")?;
        let geocoder = Geocoder::new(&config.geocode.search_url, user_agent, timeout)
            .context("Failed to create geocoder")?;
        let radar = RadarClient::new(
            &config.radar.index_url,
            &config.radar.tile_base_url,
            user_agent,
            timeout,
        )
        .context("Failed to create radar client")?;

        let overlay = Arc::new(Mutex::new(MapOverlayManager::new(map, config.ui.dark_mode)));
        let controller = Arc::new(SelectionController::new(
            Arc::new(nws),
            Arc::new(geocoder),
            overlay.clone(),
            ControllerOptions {
                selection_zoom: config.ui.selection_zoom,
                discard_stale_selections: config.ui.discard_stale_selections,
            },
        ));

        let store: Arc<dyn FavoriteStore> =
            Arc::new(JsonFavoriteStore::new(config.favorites_path()));
        let favorites = FavoritesModel::new(store);
        let radar = RadarRefresh::new(radar, overlay, config.radar.opacity);

        Ok(Self {
            config,
            controller,
            favorites,
            radar,
            shutdown: CancellationToken::new(),
            radar_task: None,
        })
    }

    /// Load favorites and start the radar refresh loop.
    pub async fn start(&mut self) {
        self.favorites.load().await;

        let interval =
            Duration::from_secs(u64::from(self.config.radar.refresh_minutes.max(1)) * 60);
        tracing::info!("Radar refresh every {:?}", interval);
        self.radar_task = Some(self.radar.clone().spawn(interval, self.shutdown.child_token()));
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &Arc<SelectionController> {
        &self.controller
    }

    pub fn favorites(&self) -> &FavoritesModel {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesModel {
        &mut self.favorites
    }

    pub fn initial_center(&self) -> Location {
        Location::new(self.config.ui.initial_center.lat, self.config.ui.initial_center.lng)
    }

    /// Stop background work and wait for it to finish.
    pub async fn shutdown(&mut self) {
        tracing::info!("Shutting down EchoWx");
        self.shutdown.cancel();

        if let Some(task) = self.radar_task.take() {
            if let Err(e) = task.await {
                tracing::error!("Radar task ended abnormally: {}", e);
            }
        }

        if self.favorites.unsaved_changes() {
            tracing::warn!("Exiting with favorites changes that were not saved");
        }
    }
}
