//! Map substrate abstraction.
//!
//! The overlay manager only ever adds, removes and annotates layers and moves
//! the view. `HeadlessMap` records those calls so the whole pipeline can run
//! without a rendering toolkit.

use std::collections::BTreeMap;
use std::sync::Arc;

use echowx_weather::Location;
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// Colors for the legend box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendTheme {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

impl LegendTheme {
    pub const LIGHT: LegendTheme = LegendTheme {
        background: "#FFFFFF",
        text: "#000000",
        border: "#CCCCCC",
    };

    pub const DARK: LegendTheme = LegendTheme {
        background: "#1E1E1E",
        text: "#FFFFFF",
        border: "#444444",
    };

    pub fn for_dark_mode(dark: bool) -> Self {
        if dark {
            Self::DARK
        } else {
            Self::LIGHT
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub label: &'static str,
    pub colors: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub rows: Vec<LegendRow>,
    pub theme: LegendTheme,
    /// The legend carries a close control. Its click is reported as
    /// `MapEvent::LegendDismiss` and is never treated as a map click.
    pub dismissible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker {
        at: Location,
    },
    /// Filled polygon, vertices as (lat, lng).
    Polygon {
        vertices: Vec<(f64, f64)>,
        color: &'static str,
    },
    Tile {
        url_template: String,
        opacity: f32,
        max_zoom: u8,
        attribution: &'static str,
    },
    Legend(Legend),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub headline: String,
    pub description: String,
    pub sender: String,
}

/// Input from the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Click(Location),
    LegendDismiss,
}

pub trait MapSurface: Send {
    fn add_layer(&mut self, layer: Layer) -> LayerId;

    /// Removing an unknown id is a no-op.
    fn remove_layer(&mut self, id: LayerId);

    /// Recenter; `None` keeps the current zoom.
    fn set_view(&mut self, center: Location, zoom: Option<u8>);

    fn bind_popup(&mut self, id: LayerId, popup: Popup);
}

#[derive(Debug, Default)]
struct MapRecord {
    next_id: u64,
    layers: BTreeMap<LayerId, Layer>,
    popups: BTreeMap<LayerId, Popup>,
    center: Option<Location>,
    zoom: Option<u8>,
}

/// In-memory map. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMap {
    record: Arc<Mutex<MapRecord>>,
}

impl HeadlessMap {
    pub fn new(center: Location, zoom: u8) -> Self {
        let map = Self::default();
        {
            let mut record = map.record.lock();
            record.center = Some(center);
            record.zoom = Some(zoom);
        }
        map
    }

    pub fn layers(&self) -> Vec<(LayerId, Layer)> {
        self.record
            .lock()
            .layers
            .iter()
            .map(|(id, layer)| (*id, layer.clone()))
            .collect()
    }

    pub fn count_layers(&self, pred: impl Fn(&Layer) -> bool) -> usize {
        self.record.lock().layers.values().filter(|l| pred(*l)).count()
    }

    pub fn popup(&self, id: LayerId) -> Option<Popup> {
        self.record.lock().popups.get(&id).cloned()
    }

    pub fn center(&self) -> Option<Location> {
        self.record.lock().center
    }

    pub fn zoom(&self) -> Option<u8> {
        self.record.lock().zoom
    }
}

impl MapSurface for HeadlessMap {
    fn add_layer(&mut self, layer: Layer) -> LayerId {
        let mut record = self.record.lock();
        record.next_id += 1;
        let id = LayerId(record.next_id);
        record.layers.insert(id, layer);
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        let mut record = self.record.lock();
        record.layers.remove(&id);
        record.popups.remove(&id);
    }

    fn set_view(&mut self, center: Location, zoom: Option<u8>) {
        let mut record = self.record.lock();
        record.center = Some(center);
        if zoom.is_some() {
            record.zoom = zoom;
        }
    }

    fn bind_popup(&mut self, id: LayerId, popup: Popup) {
        let mut record = self.record.lock();
        if record.layers.contains_key(&id) {
            record.popups.insert(id, popup);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_layers() {
        let map = HeadlessMap::new(Location::new(39.5, -98.35), 4);
        let mut handle = map.clone();

        let id = handle.add_layer(Layer::Marker {
            at: Location::new(1.0, 2.0),
        });
        assert_eq!(map.layers().len(), 1);

        handle.remove_layer(id);
        handle.remove_layer(id);
        assert!(map.layers().is_empty());
    }

    #[test]
    fn test_set_view_keeps_zoom_when_none() {
        let mut map = HeadlessMap::new(Location::new(39.5, -98.35), 4);
        map.set_view(Location::new(40.0, -100.0), None);
        assert_eq!(map.zoom(), Some(4));
        map.set_view(Location::new(40.0, -100.0), Some(10));
        assert_eq!(map.zoom(), Some(10));
        assert_eq!(map.center(), Some(Location::new(40.0, -100.0)));
    }

    #[test]
    fn test_popup_requires_layer() {
        let mut map = HeadlessMap::default();
        let popup = Popup {
            headline: "h".into(),
            description: "d".into(),
            sender: "s".into(),
        };
        map.bind_popup(LayerId(99), popup.clone());
        assert!(map.popup(LayerId(99)).is_none());

        let id = map.add_layer(Layer::Polygon {
            vertices: vec![(1.0, 2.0)],
            color: "#FF0000",
        });
        map.bind_popup(id, popup.clone());
        assert_eq!(map.popup(id), Some(popup));
    }
}
