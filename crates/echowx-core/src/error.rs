//! Centralized error types for the EchoWx application.
//!
//! Lower crates (`echowx-weather`, `echowx-services`) keep their own precise
//! error enums; the UI layer maps them into `AppError` so the shell has one
//! place to ask for a user-facing message.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Persistence(e) => e.user_message(),
        }
    }

    /// Whether the shell should interrupt the user with a blocking notice.
    ///
    /// Only location search failures are surfaced this way; everything else
    /// leaves panels empty and is reported through the log.
    pub fn is_user_notice(&self) -> bool {
        matches!(
            self,
            AppError::Weather(WeatherError::LocationNotFound(_))
                | AppError::Weather(WeatherError::SearchFailed(_))
        )
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Weather lookup errors, as seen by the user.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Location search failed: {0}")]
    SearchFailed(String),

    #[error("No observation station found")]
    NoStationFound,

    #[error("No radar frame available")]
    NoRadarFrame,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound(_) => "Location not found.",
            WeatherError::SearchFailed(_) => "Error searching for location.",
            WeatherError::NoStationFound => "No weather station reports conditions here.",
            WeatherError::NoRadarFrame => "Radar imagery is temporarily unavailable.",
        }
    }
}

/// Favorites persistence errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to load favorites: {0}")]
    LoadFailed(String),

    #[error("Failed to save favorites: {0}")]
    SaveFailed(String),
}

impl PersistenceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PersistenceError::LoadFailed(_) => "Saved favorites could not be loaded.",
            PersistenceError::SaveFailed(_) => {
                "Favorites could not be saved. Recent changes may be lost on restart."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
