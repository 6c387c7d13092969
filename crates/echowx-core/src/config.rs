use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// UI preferences
    pub ui: UiConfig,

    /// National Weather Service API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Radar tile provider settings
    #[serde(default)]
    pub radar: RadarConfig,

    /// Forward geocoding settings
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Favorites storage settings
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

/// A map position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Dark mode enabled (also themes the alert legend)
    pub dark_mode: bool,

    /// Where the map opens
    #[serde(default = "default_initial_center")]
    pub initial_center: MapCenter,

    /// Zoom level the map opens at
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,

    /// Zoom applied when a search result or favorite is selected
    #[serde(default = "default_selection_zoom")]
    pub selection_zoom: u8,

    /// Drop results of a lookup that was superseded by a newer selection.
    ///
    /// Off by default: overlapping lookups race and the last one to finish
    /// owns the panels.
    #[serde(default)]
    pub discard_stale_selections: bool,
}

fn default_initial_center() -> MapCenter {
    MapCenter {
        lat: 39.5,
        lng: -98.35,
    }
}

fn default_initial_zoom() -> u8 {
    4
}

fn default_selection_zoom() -> u8 {
    10
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            initial_center: default_initial_center(),
            initial_zoom: default_initial_zoom(),
            selection_zoom: default_selection_zoom(),
            discard_stale_selections: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the api.weather.gov compatible service
    pub api_base_url: String,

    /// User-Agent sent with every request (required by api.weather.gov)
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.weather.gov".to_string(),
            user_agent: format!("EchoWx/{} (echowx@localhost)", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarConfig {
    /// Frame index listing available radar composites
    pub index_url: String,

    /// Host serving radar tiles
    pub tile_base_url: String,

    /// Refresh interval in minutes
    pub refresh_minutes: u32,

    /// Opacity of the radar tile layer
    #[serde(default = "default_radar_opacity")]
    pub opacity: f32,
}

fn default_radar_opacity() -> f32 {
    0.6
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            index_url: "https://api.rainviewer.com/public/weather-maps.json".to_string(),
            tile_base_url: "https://tilecache.rainviewer.com".to_string(),
            refresh_minutes: 5,
            opacity: default_radar_opacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Nominatim-compatible search endpoint
    pub search_url: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            search_url: "https://nominatim.openstreetmap.org/search".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoritesConfig {
    /// Override for the favorites file location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Where favorites are persisted: the configured override, else
    /// `favorites.json` next to the config file.
    pub fn favorites_path(&self) -> PathBuf {
        self.favorites
            .path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("favorites.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("echowx");

        Self {
            config_dir,
            ui: UiConfig::default(),
            weather: WeatherConfig::default(),
            radar: RadarConfig::default(),
            geocode: GeocodeConfig::default(),
            favorites: FavoritesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating it with defaults
    /// when missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);
        self.validate_url(&self.radar.index_url, "radar.index_url", &mut result);
        self.validate_url(&self.radar.tile_base_url, "radar.tile_base_url", &mut result);
        self.validate_url(&self.geocode.search_url, "geocode.search_url", &mut result);

        if self.weather.user_agent.trim().is_empty() {
            result.add_error(
                "weather.user_agent",
                "User agent must not be empty (api.weather.gov rejects anonymous requests)",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        let center = self.ui.initial_center;
        if !(-90.0..=90.0).contains(&center.lat) || !(-180.0..=180.0).contains(&center.lng) {
            result.add_error("ui.initial_center", "Initial center is outside valid coordinates");
        }

        if self.ui.selection_zoom > 19 {
            result.add_warning("ui.selection_zoom", "Selection zoom beyond tile range (>19)");
        }

        // Validate radar refresh interval
        if self.radar.refresh_minutes == 0 {
            result.add_warning("radar.refresh_minutes", "Radar refresh disabled (0 minutes)");
        } else if self.radar.refresh_minutes > 60 {
            result.add_warning(
                "radar.refresh_minutes",
                "Radar refresh interval is more than an hour; imagery will look stale",
            );
        }

        if !(0.0..=1.0).contains(&self.radar.opacity) {
            result.add_error("radar.opacity", "Opacity must be between 0.0 and 1.0");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("echowx");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.weather.api_base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.api_base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.radar.index_url = "ftp://example.com/frames.json".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_empty_user_agent_is_error() {
        let mut config = Config::default();
        config.weather.user_agent = "  ".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "weather.user_agent"));
    }

    #[test]
    fn test_zero_radar_refresh_is_warning() {
        let mut config = Config::default();
        config.radar.refresh_minutes = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "radar.refresh_minutes"));
    }

    #[test]
    fn test_initial_center_out_of_range() {
        let mut config = Config::default();
        config.ui.initial_center = MapCenter {
            lat: 95.0,
            lng: -98.35,
        };
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "ui.initial_center"));
    }

    #[test]
    fn test_favorites_path_defaults_to_config_dir() {
        let mut config = Config::default();
        config.config_dir = PathBuf::from("/tmp/echowx-test");
        assert_eq!(
            config.favorites_path(),
            PathBuf::from("/tmp/echowx-test/favorites.json")
        );

        config.favorites.path = Some(PathBuf::from("/elsewhere/favs.json"));
        assert_eq!(config.favorites_path(), PathBuf::from("/elsewhere/favs.json"));
    }

    #[test]
    fn test_load_from_creates_default_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.radar.refresh_minutes, 5);

        let mut edited = created.clone();
        edited.ui.dark_mode = true;
        edited.ui.discard_stale_selections = true;
        edited.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert!(reloaded.ui.dark_mode);
        assert!(reloaded.ui.discard_stale_selections);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let toml_src = r#"
            config_dir = "/tmp/echowx"

            [ui]
            dark_mode = true
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert!(config.ui.dark_mode);
        assert_eq!(config.ui.selection_zoom, 10);
        assert_eq!(config.ui.initial_zoom, 4);
        assert_eq!(config.weather.api_base_url, "https://api.weather.gov");
        assert_eq!(config.radar.refresh_minutes, 5);
        assert!(config.favorites.path.is_none());
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
