//! Favorites list model: pin, rename, delete and filter saved locations.
//!
//! Mutations apply to the in-memory list first and are then persisted. A
//! failed save is not rolled back; `unsaved_changes()` reports the
//! divergence until the next successful save.

use std::sync::Arc;

use async_trait::async_trait;
use echowx_services::{Favorite, FavoriteStore};
use echowx_weather::Location;

use crate::error_mapping::{load_error, IntoAppError};
use crate::render::{render_favorites, FavoriteRow};

pub const PIN_PROMPT_TITLE: &str = "Enter a name for this location";
pub const EDIT_PROMPT_TITLE: &str = "Edit Favorite";
pub const NO_SELECTION_NOTICE: &str = "Please click on the map to select a location first!";

/// Modal text input. `None` means the user cancelled.
#[async_trait]
pub trait Prompt: Send + Sync {
    async fn prompt(&self, title: &str, initial: Option<&str>) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    /// Nothing selected yet; the shell shows `NO_SELECTION_NOTICE`.
    NoSelection,
    Cancelled,
    Pinned,
}

pub struct FavoritesModel {
    store: Arc<dyn FavoriteStore>,
    favorites: Vec<Favorite>,
    filter: String,
    unsaved: bool,
}

impl FavoritesModel {
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self {
            store,
            favorites: Vec::new(),
            filter: String::new(),
            unsaved: false,
        }
    }

    /// Replace the in-memory list with the stored one. A store failure
    /// leaves the list empty.
    pub async fn load(&mut self) {
        self.favorites = match self.store.load().await {
            Ok(favorites) => favorites,
            Err(e) => {
                let err = load_error(e);
                tracing::error!("{}: {}", err.user_message(), err);
                Vec::new()
            }
        };
    }

    pub async fn pin_current(
        &mut self,
        selected: Option<Location>,
        prompt: &dyn Prompt,
    ) -> PinOutcome {
        let Some(location) = selected else {
            return PinOutcome::NoSelection;
        };

        let name = match prompt.prompt(PIN_PROMPT_TITLE, None).await {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => return PinOutcome::Cancelled,
        };

        tracing::info!("Pinning '{}' at {}", name, location);
        self.favorites.push(Favorite::new(name, location.lat, location.lng));
        self.persist().await;
        PinOutcome::Pinned
    }

    /// Rename the favorite at `index` in the unfiltered list. Returns whether
    /// anything changed.
    pub async fn rename(&mut self, index: usize, prompt: &dyn Prompt) -> bool {
        let Some(current) = self.favorites.get(index).map(|f| f.name.clone()) else {
            tracing::warn!("Rename of unknown favorite index {}", index);
            return false;
        };

        let new_name = match prompt.prompt(EDIT_PROMPT_TITLE, Some(&current)).await {
            Some(name) => name.trim().to_string(),
            None => return false,
        };
        if new_name.is_empty() || new_name == current {
            return false;
        }

        // The list may have changed while the prompt was open.
        let Some(favorite) = self.favorites.get_mut(index) else {
            return false;
        };
        favorite.name = new_name;
        self.persist().await;
        true
    }

    pub async fn delete(&mut self, index: usize) -> bool {
        if index >= self.favorites.len() {
            tracing::warn!("Delete of unknown favorite index {}", index);
            return false;
        }
        let removed = self.favorites.remove(index);
        tracing::info!("Deleted favorite '{}'", removed.name);
        self.persist().await;
        true
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn rows(&self) -> Vec<FavoriteRow> {
        render_favorites(&self.favorites, &self.filter)
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    /// Location to select when the favorite at `index` is activated.
    pub fn location_of(&self, index: usize) -> Option<Location> {
        self.favorites.get(index).map(|f| Location::new(f.lat, f.lng))
    }

    /// True while memory holds changes the last save did not write.
    pub fn unsaved_changes(&self) -> bool {
        self.unsaved
    }

    async fn persist(&mut self) {
        match self.store.save(&self.favorites).await {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                let err = e.into_app_error();
                tracing::error!("Error saving favorites: {}", err);
                self.unsaved = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echowx_services::FavoritesError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<Favorite>>,
        fail_saves: AtomicBool,
    }

    #[async_trait]
    impl FavoriteStore for MemoryStore {
        async fn load(&self) -> Result<Vec<Favorite>, FavoritesError> {
            Ok(self.saved.lock().clone())
        }

        async fn save(&self, favorites: &[Favorite]) -> Result<(), FavoritesError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(FavoritesError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            *self.saved.lock() = favorites.to_vec();
            Ok(())
        }
    }

    struct Answer(Option<&'static str>);

    #[async_trait]
    impl Prompt for Answer {
        async fn prompt(&self, _: &str, _: Option<&str>) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    async fn seeded(names: &[&str]) -> (Arc<MemoryStore>, FavoritesModel) {
        let store = Arc::new(MemoryStore::default());
        *store.saved.lock() = names
            .iter()
            .enumerate()
            .map(|(i, n)| Favorite::new(*n, i as f64, -(i as f64)))
            .collect();
        let mut model = FavoritesModel::new(store.clone());
        model.load().await;
        (store, model)
    }

    #[tokio::test]
    async fn test_pin_requires_selection() {
        let (store, mut model) = seeded(&[]).await;
        let outcome = model.pin_current(None, &Answer(Some("Home"))).await;

        assert_eq!(outcome, PinOutcome::NoSelection);
        assert!(store.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_pin_cancelled_or_blank_is_noop() {
        let (_, mut model) = seeded(&[]).await;
        let here = Some(Location::new(39.5, -98.35));

        assert_eq!(model.pin_current(here, &Answer(None)).await, PinOutcome::Cancelled);
        assert_eq!(model.pin_current(here, &Answer(Some("   "))).await, PinOutcome::Cancelled);
        assert!(model.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_pin_persists() {
        let (store, mut model) = seeded(&[]).await;
        let outcome = model
            .pin_current(Some(Location::new(39.5, -98.35)), &Answer(Some("Home")))
            .await;

        assert_eq!(outcome, PinOutcome::Pinned);
        assert_eq!(*store.saved.lock(), vec![Favorite::new("Home", 39.5, -98.35)]);
        assert!(!model.unsaved_changes());
    }

    #[tokio::test]
    async fn test_rename_and_delete_use_unfiltered_index() {
        let (store, mut model) = seeded(&["Omaha", "Denver", "Dallas"]).await;
        model.set_filter("d");

        let rows = model.rows();
        assert_eq!(rows[0].name, "Dallas");

        // Acting on the first visible row must touch "Dallas", not "Omaha".
        assert!(model.rename(rows[0].index, &Answer(Some("Big D"))).await);
        assert_eq!(model.favorites()[2].name, "Big D");
        assert_eq!(model.favorites()[0].name, "Omaha");

        let rows = model.rows();
        let denver = rows.iter().find(|r| r.name == "Denver").unwrap();
        assert!(model.delete(denver.index).await);

        let names: Vec<_> = store.saved.lock().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["Omaha", "Big D"]);
    }

    #[tokio::test]
    async fn test_rename_unchanged_is_noop() {
        let (_, mut model) = seeded(&["Omaha"]).await;
        assert!(!model.rename(0, &Answer(Some("Omaha"))).await);
        assert!(!model.rename(0, &Answer(Some(""))).await);
        assert!(!model.rename(0, &Answer(None)).await);
        assert!(!model.rename(5, &Answer(Some("x"))).await);
    }

    #[tokio::test]
    async fn test_failed_save_is_surfaced_then_cleared() {
        let (store, mut model) = seeded(&["Omaha"]).await;
        store.fail_saves.store(true, Ordering::SeqCst);

        assert!(model.delete(0).await);
        assert!(model.favorites().is_empty());
        assert!(model.unsaved_changes());
        assert_eq!(store.saved.lock().len(), 1);

        store.fail_saves.store(false, Ordering::SeqCst);
        model
            .pin_current(Some(Location::new(1.0, 2.0)), &Answer(Some("Cabin")))
            .await;
        assert!(!model.unsaved_changes());
        assert_eq!(store.saved.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_location_of() {
        let (_, model) = seeded(&["Omaha", "Denver"]).await;
        assert_eq!(model.location_of(1), Some(Location::new(1.0, -1.0)));
        assert_eq!(model.location_of(2), None);
    }
}
