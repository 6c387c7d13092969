pub mod favorite_store;

pub use favorite_store::{Favorite, FavoriteStore, FavoritesError, JsonFavoriteStore};
