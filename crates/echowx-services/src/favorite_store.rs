//! Favorite locations and their on-disk store.
//!
//! The whole list is written on every change as pretty-printed JSON. Order on
//! disk is insertion order; display order is decided by the caller.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bookmarked location. Names need not be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Favorite {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
        }
    }
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("Favorites file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Favorites file is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type FavoritesResult<T> = Result<T, FavoritesError>;

/// Persistence for the favorites list.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn load(&self) -> FavoritesResult<Vec<Favorite>>;

    /// Replace the stored list with `favorites`.
    async fn save(&self, favorites: &[Favorite]) -> FavoritesResult<()>;
}

/// JSON file store at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFavoriteStore {
    path: PathBuf,
}

impl JsonFavoriteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FavoriteStore for JsonFavoriteStore {
    async fn load(&self) -> FavoritesResult<Vec<Favorite>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No favorites file at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let favorites: Vec<Favorite> = serde_json::from_str(&json)?;
        tracing::info!("Loaded {} favorites from {:?}", favorites.len(), self.path);
        Ok(favorites)
    }

    async fn save(&self, favorites: &[Favorite]) -> FavoritesResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(favorites)?;
        tokio::fs::write(&self.path, json).await?;

        tracing::debug!("Saved {} favorites to {:?}", favorites.len(), self.path);
        Ok(())
    }
}
