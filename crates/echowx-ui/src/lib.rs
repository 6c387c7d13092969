//! Presentation core for EchoWx: selection orchestration, map overlays,
//! panel rendering and the favorites list.
//!
//! Nothing here depends on a widget toolkit. A shell drives it through
//! `SelectionController` and `FavoritesModel` and supplies a `MapSurface`.

pub mod app;
pub mod controller;
pub mod error_mapping;
pub mod favorites;
pub mod map;
pub mod overlay;
pub mod radar_refresh;
pub mod render;
pub mod view;

pub use app::EchoWxApp;
pub use controller::{ControllerOptions, SelectionController, SessionState};
pub use favorites::{FavoritesModel, PinOutcome, Prompt};
pub use map::{HeadlessMap, Layer, LayerId, MapEvent, MapSurface, Popup};
pub use overlay::MapOverlayManager;
pub use radar_refresh::RadarRefresh;
pub use view::{Fragment, Panel, ViewState};
