//! Maps provider and store errors to `echowx_core::AppError` for consistent
//! user-facing messages.

use echowx_core::error::ReqwestErrorExt;
use echowx_core::{AppError, NetworkError, PersistenceError, WeatherError};
use echowx_services::FavoritesError;
use echowx_weather::WeatherError as ProviderError;

pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for ProviderError {
    fn into_app_error(self) -> AppError {
        match self {
            ProviderError::Network(e) => AppError::Network(e.into_network_error()),
            ProviderError::Status { status, url } => AppError::Network(NetworkError::ServerError {
                status,
                message: url,
            }),
            ProviderError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            ProviderError::NoStationFound => AppError::Weather(WeatherError::NoStationFound),
            ProviderError::NoRadarFrameAvailable => AppError::Weather(WeatherError::NoRadarFrame),
            ProviderError::GeocodeNotFound(q) => {
                AppError::Weather(WeatherError::LocationNotFound(q))
            }
        }
    }
}

impl IntoAppError for FavoritesError {
    fn into_app_error(self) -> AppError {
        AppError::Persistence(PersistenceError::SaveFailed(self.to_string()))
    }
}

/// A failed place search: "not found" when the provider had no match,
/// otherwise a search failure.
pub fn search_error(e: ProviderError) -> AppError {
    match e {
        ProviderError::GeocodeNotFound(q) => AppError::Weather(WeatherError::LocationNotFound(q)),
        other => AppError::Weather(WeatherError::SearchFailed(other.to_string())),
    }
}

/// A favorites file that could not be read.
pub fn load_error(e: FavoritesError) -> AppError {
    AppError::Persistence(PersistenceError::LoadFailed(e.to_string()))
}
