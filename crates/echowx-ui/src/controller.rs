//! Selection orchestration: "show the weather for this location".
//!
//! Map clicks, place searches and favorite activations all funnel into one
//! sequence. Record the selection, move the map and marker, enter `Loading`,
//! yield once, fetch concurrently, render, then leave `Loading` whatever
//! happened.
//!
//! Orchestrations are not serialized. Two overlapping selections both
//! render and the one that finishes last wins, unless stale results are
//! configured to be discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use echowx_core::AppError;
use echowx_weather::geocode::{self, GeocodeSource};
use echowx_weather::{Location, WeatherSource};
use parking_lot::Mutex;

use crate::error_mapping::{search_error, IntoAppError};
use crate::map::MapEvent;
use crate::overlay::MapOverlayManager;
use crate::render::{format_conditions, render_alerts, render_forecast};
use crate::view::{Panel, ViewState};

/// Everything the shell displays for the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub selected: Option<Location>,
    pub view: ViewState,
    /// "City, ST", empty when unknown.
    pub header: String,
    pub conditions: Option<String>,
    pub forecast: Panel,
    pub alerts: Panel,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    /// Zoom applied by search and favorite selections. Clicks keep the zoom.
    pub selection_zoom: u8,
    pub discard_stale_selections: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            selection_zoom: 10,
            discard_stale_selections: false,
        }
    }
}

pub struct SelectionController {
    weather: Arc<dyn WeatherSource>,
    geocoder: Arc<dyn GeocodeSource>,
    overlay: Arc<Mutex<MapOverlayManager>>,
    session: Mutex<SessionState>,
    generation: AtomicU64,
    options: ControllerOptions,
}

impl SelectionController {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        geocoder: Arc<dyn GeocodeSource>,
        overlay: Arc<Mutex<MapOverlayManager>>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            weather,
            geocoder,
            overlay,
            session: Mutex::new(SessionState::default()),
            generation: AtomicU64::new(0),
            options,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session.lock().clone()
    }

    pub fn selected(&self) -> Option<Location> {
        self.session.lock().selected
    }

    pub fn overlay(&self) -> &Arc<Mutex<MapOverlayManager>> {
        &self.overlay
    }

    /// Route an event from the map widget. Legend dismissals never reach
    /// selection handling.
    pub async fn handle_map_event(&self, event: MapEvent) {
        match event {
            MapEvent::Click(location) => self.select_from_click(location).await,
            MapEvent::LegendDismiss => self.overlay.lock().dismiss_legend(),
        }
    }

    pub async fn select_from_click(&self, location: Location) {
        tracing::info!("Map click at {}", location);
        self.select(location, None).await;
    }

    pub async fn select_favorite(&self, location: Location) {
        tracing::info!("Favorite selected at {}", location);
        self.select(location, Some(self.options.selection_zoom)).await;
    }

    /// Geocode `query` and select the result.
    ///
    /// An empty query does nothing and returns `Ok(None)`. Errors carry the
    /// notice text the shell should show.
    pub async fn search(&self, query: &str) -> Result<Option<Location>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        {
            let mut session = self.session.lock();
            session.view = ViewState::Loading;
            session.forecast.clear();
            session.alerts.clear();
        }

        match geocode::resolve(self.geocoder.as_ref(), query).await {
            Ok(location) => {
                tracing::info!("Search '{}' resolved to {}", query, location);
                self.select(location, Some(self.options.selection_zoom)).await;
                Ok(Some(location))
            }
            Err(e) => {
                tracing::error!("Error searching location '{}': {}", query, e);
                let mut session = self.session.lock();
                if session.view == ViewState::Loading {
                    session.view = ViewState::Failed;
                }
                Err(search_error(e))
            }
        }
    }

    async fn select(&self, location: Location, zoom: Option<u8>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.session.lock().selected = Some(location);
        {
            let mut overlay = self.overlay.lock();
            overlay.set_view(location, zoom);
            overlay.place_marker(location);
        }
        {
            let mut session = self.session.lock();
            session.view = ViewState::Loading;
            session.forecast.clear();
            session.alerts.clear();
        }

        // Let the shell paint the indicator before the network calls start.
        tokio::task::yield_now().await;

        let (periods, alerts, point) = tokio::join!(
            self.weather.forecast(location),
            self.weather.active_alerts(location),
            self.weather.point_metadata(location),
        );

        let point = match point {
            Ok(point) => Some(point),
            Err(e) => {
                let app_err = e.into_app_error();
                tracing::error!("Point metadata for {} failed: {}", location, app_err);
                None
            }
        };

        let conditions = match &point {
            Some(point) => match self
                .weather
                .current_conditions(&point.observation_stations_url)
                .await
            {
                Ok(conditions) => format_conditions(&conditions),
                Err(e) => {
                    tracing::warn!("Could not load current conditions: {}", e);
                    None
                }
            },
            None => None,
        };

        if self.options.discard_stale_selections
            && self.generation.load(Ordering::SeqCst) != generation
        {
            tracing::debug!("Discarding stale selection for {}", location);
            return;
        }

        let obtained_any = !periods.is_empty() || !alerts.is_empty() || point.is_some();

        // Fresh panels: output of an overlapping selection never mixes in.
        let mut forecast = Panel::default();
        render_forecast(&mut forecast, &periods);
        let mut alert_panel = Panel::default();
        render_alerts(&mut alert_panel, &alerts);
        {
            let mut session = self.session.lock();
            session.header = point.map(|p| p.place_name()).unwrap_or_default();
            session.conditions = conditions;
            session.forecast = forecast;
            session.alerts = alert_panel;
            session.view = session.view.on_finished(obtained_any);
        }
        self.overlay.lock().redraw_alerts(&alerts);

        tracing::info!(
            "Rendered {} periods and {} alerts for {}",
            periods.len(),
            alerts.len(),
            location
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{HeadlessMap, Layer};
    use async_trait::async_trait;
    use echowx_weather::{
        Alert, CurrentConditions, ForecastPeriod, GeocodeResult, PointMetadata, Severity,
        WeatherError,
    };

    struct CannedWeather {
        fail_point: bool,
    }

    #[async_trait]
    impl WeatherSource for CannedWeather {
        async fn point_metadata(&self, _: Location) -> Result<PointMetadata, WeatherError> {
            if self.fail_point {
                return Err(WeatherError::Status {
                    status: 500,
                    url: "points".into(),
                });
            }
            Ok(PointMetadata {
                city: "Wichita".into(),
                state: "KS".into(),
                observation_stations_url: "stations".into(),
                forecast_url: "forecast".into(),
            })
        }

        async fn forecast(&self, _: Location) -> Vec<ForecastPeriod> {
            if self.fail_point {
                return Vec::new();
            }
            vec![ForecastPeriod {
                name: "Tonight".into(),
                detailed_forecast: "Clear.".into(),
            }]
        }

        async fn active_alerts(&self, _: Location) -> Vec<Alert> {
            if self.fail_point {
                return Vec::new();
            }
            vec![Alert {
                id: "1".into(),
                headline: "Tornado Warning".into(),
                description: "Take cover.".into(),
                event: "Tornado Warning".into(),
                severity: Severity::Extreme,
                polygon: Some(vec![(-97.0, 37.0), (-97.5, 37.5), (-97.0, 37.0)]),
                sender_name: "NWS".into(),
            }]
        }

        async fn current_conditions(&self, _: &str) -> Result<CurrentConditions, WeatherError> {
            Err(WeatherError::NoStationFound)
        }
    }

    struct NoResults;

    #[async_trait]
    impl GeocodeSource for NoResults {
        async fn search(&self, _: &str) -> Result<Vec<GeocodeResult>, WeatherError> {
            Ok(Vec::new())
        }
    }

    fn controller(fail_point: bool) -> (HeadlessMap, SelectionController) {
        let map = HeadlessMap::new(Location::new(39.5, -98.35), 4);
        let overlay = Arc::new(Mutex::new(MapOverlayManager::new(Box::new(map.clone()), false)));
        let controller = SelectionController::new(
            Arc::new(CannedWeather { fail_point }),
            Arc::new(NoResults),
            overlay,
            ControllerOptions::default(),
        );
        (map, controller)
    }

    #[tokio::test]
    async fn test_click_renders_and_keeps_zoom() {
        let (map, controller) = controller(false);
        controller
            .handle_map_event(MapEvent::Click(Location::new(37.69, -97.33)))
            .await;

        let session = controller.session();
        assert_eq!(session.selected, Some(Location::new(37.69, -97.33)));
        assert_eq!(session.view, ViewState::Rendered);
        assert_eq!(session.header, "Wichita, KS");
        assert_eq!(session.conditions, None);
        assert!(!session.forecast.is_empty());
        assert!(!session.alerts.is_empty());
        assert_eq!(map.zoom(), Some(4));
        assert_eq!(map.count_layers(|l| matches!(l, Layer::Polygon { .. })), 1);
    }

    #[tokio::test]
    async fn test_total_failure_clears_indicator() {
        let (_, controller) = controller(true);
        controller.select_from_click(Location::new(10.0, 10.0)).await;

        let session = controller.session();
        assert_eq!(session.view, ViewState::Failed);
        assert!(!session.view.shows_indicator());
        assert!(session.header.is_empty());
        assert!(session.forecast.is_empty());
    }

    #[tokio::test]
    async fn test_favorite_applies_selection_zoom() {
        let (map, controller) = controller(false);
        controller.select_favorite(Location::new(37.69, -97.33)).await;
        assert_eq!(map.zoom(), Some(10));
    }

    #[tokio::test]
    async fn test_legend_dismiss_is_not_a_selection() {
        let (_, controller) = controller(false);
        controller.select_from_click(Location::new(37.69, -97.33)).await;
        controller.handle_map_event(MapEvent::LegendDismiss).await;

        assert_eq!(controller.selected(), Some(Location::new(37.69, -97.33)));
        assert!(!controller.overlay().lock().legend_visible());
        assert!(controller.overlay().lock().legend_dismissed());
    }

    #[tokio::test]
    async fn test_search_not_found() {
        let (_, controller) = controller(false);
        let err = controller.search("Atlantis").await.unwrap_err();

        assert_eq!(err.user_message(), "Location not found.");
        assert_eq!(controller.session().view, ViewState::Failed);
        assert_eq!(controller.selected(), None);
    }

    #[tokio::test]
    async fn test_empty_search_is_noop() {
        let (_, controller) = controller(false);
        assert!(controller.search("   ").await.unwrap().is_none());
        assert_eq!(controller.session(), SessionState::default());
    }
}
