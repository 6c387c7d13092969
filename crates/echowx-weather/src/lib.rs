//! Weather data providers for EchoWx
//!
//! NWS point metadata, forecasts, alerts and observations; RainViewer radar
//! frame discovery; Nominatim place search; and the alert color taxonomy.

pub mod classify;
pub mod geocode;
pub mod nws;
pub mod outlook;
pub mod radar;
pub mod types;

pub use classify::{classify, classify_alert, Hazard, LegendCategory};
pub use geocode::{GeocodeResult, GeocodeSource, Geocoder};
pub use nws::{NwsClient, WeatherSource};
pub use outlook::spc_outlook_url;
pub use radar::RadarClient;
pub use types::*;
