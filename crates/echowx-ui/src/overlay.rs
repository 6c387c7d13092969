//! Layers EchoWx owns on the map: the selection marker, the radar tiles,
//! warning polygons and their legend.
//!
//! Every replacement removes the old layer before adding the new one, so at
//! most one marker and one radar layer are ever attached.

use echowx_weather::classify::{category_colors, classify_alert, LegendCategory};
use echowx_weather::radar::{RADAR_ATTRIBUTION, RADAR_MAX_ZOOM};
use echowx_weather::{Alert, Location, RadarFrame};

use crate::map::{Layer, LayerId, Legend, LegendRow, LegendTheme, MapSurface, Popup};

/// Popup descriptions longer than this are cut and end in an ellipsis.
pub const POPUP_DESCRIPTION_LIMIT: usize = 300;

pub struct MapOverlayManager {
    map: Box<dyn MapSurface>,
    marker: Option<LayerId>,
    radar: Option<LayerId>,
    polygons: Vec<LayerId>,
    legend: Option<LayerId>,
    legend_dismissed: bool,
    dark_mode: bool,
}

impl MapOverlayManager {
    pub fn new(map: Box<dyn MapSurface>, dark_mode: bool) -> Self {
        Self {
            map,
            marker: None,
            radar: None,
            polygons: Vec::new(),
            legend: None,
            legend_dismissed: false,
            dark_mode,
        }
    }

    pub fn set_view(&mut self, center: Location, zoom: Option<u8>) {
        self.map.set_view(center, zoom);
    }

    pub fn place_marker(&mut self, at: Location) {
        if let Some(old) = self.marker.take() {
            self.map.remove_layer(old);
        }
        self.marker = Some(self.map.add_layer(Layer::Marker { at }));
    }

    pub fn replace_radar(&mut self, frame: RadarFrame, tile_base_url: &str, opacity: f32) {
        if let Some(old) = self.radar.take() {
            self.map.remove_layer(old);
        }
        self.radar = Some(self.map.add_layer(Layer::Tile {
            url_template: frame.tile_url(tile_base_url),
            opacity,
            max_zoom: RADAR_MAX_ZOOM,
            attribution: RADAR_ATTRIBUTION,
        }));
        tracing::info!("Radar layer set to frame {}", frame.timestamp);
    }

    /// Tear down all warning polygons and draw the given set from scratch.
    ///
    /// Only warnings with geometry get a polygon. The legend is shown when at
    /// least one polygon was drawn and removed otherwise.
    pub fn redraw_alerts(&mut self, alerts: &[Alert]) {
        for id in self.polygons.drain(..) {
            self.map.remove_layer(id);
        }

        if alerts.is_empty() {
            self.remove_legend();
            return;
        }

        for alert in alerts.iter().filter(|a| a.is_warning()) {
            let Some(ring) = alert.polygon.as_ref() else {
                continue;
            };
            let hazard = classify_alert(alert);
            let vertices = ring.iter().map(|&(lon, lat)| (lat, lon)).collect();

            let id = self.map.add_layer(Layer::Polygon {
                vertices,
                color: hazard.color,
            });
            self.map.bind_popup(id, alert_popup(alert));
            self.polygons.push(id);
        }

        if self.polygons.is_empty() {
            self.remove_legend();
        } else {
            self.legend_dismissed = false;
            self.show_legend();
        }
        tracing::debug!(
            "Drew {} warning polygons for {} alerts",
            self.polygons.len(),
            alerts.len()
        );
    }

    /// Close control on the legend. Stays hidden until polygons are drawn again.
    pub fn dismiss_legend(&mut self) {
        self.remove_legend();
        self.legend_dismissed = true;
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
        if self.legend.is_some() {
            self.show_legend();
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn legend_visible(&self) -> bool {
        self.legend.is_some()
    }

    pub fn legend_dismissed(&self) -> bool {
        self.legend_dismissed
    }

    fn show_legend(&mut self) {
        if self.legend_dismissed {
            return;
        }
        if let Some(old) = self.legend.take() {
            self.map.remove_layer(old);
        }
        let legend = Legend {
            rows: LegendCategory::ALL
                .iter()
                .map(|&category| LegendRow {
                    label: category.label(),
                    colors: category_colors(category),
                })
                .collect(),
            theme: LegendTheme::for_dark_mode(self.dark_mode),
            dismissible: true,
        };
        self.legend = Some(self.map.add_layer(Layer::Legend(legend)));
    }

    fn remove_legend(&mut self) {
        if let Some(id) = self.legend.take() {
            self.map.remove_layer(id);
        }
    }
}

impl std::fmt::Debug for MapOverlayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapOverlayManager")
            .field("polygons", &self.polygon_count())
            .field("legend_visible", &self.legend_visible())
            .field("dark_mode", &self.dark_mode())
            .finish_non_exhaustive()
    }
}

fn alert_popup(alert: &Alert) -> Popup {
    Popup {
        headline: alert.headline.clone(),
        description: truncate_description(&alert.description),
        sender: alert.sender_name.clone(),
    }
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() <= POPUP_DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(POPUP_DESCRIPTION_LIMIT).collect();
    cut.push('…');
    cut
}
