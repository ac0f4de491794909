use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::constants::FAVORITES_STORAGE_KEY;
use crate::models::Movie;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FavoriteEntry {
    movie: Movie,
    added_at: DateTime<Utc>,
}

/// Locally persisted, de-duplicated set of user-selected movies.
///
/// The in-memory set is the source of truth for the UI: every mutation lands
/// there synchronously in call order, then the full set is written through to
/// the durable slot in the background. A failed write is logged and absorbed;
/// the in-memory state is never rolled back. Favorites are a convenience, so
/// any failure to read the durable copy degrades to an empty set.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    entries: Arc<RwLock<Vec<FavoriteEntry>>>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Hydrate the in-memory set from durable storage. Called once at
    /// startup; an absent key, unreadable storage, or malformed payload all
    /// yield an empty set.
    pub async fn load(&self) {
        let payload = match self.store.get(FAVORITES_STORAGE_KEY).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("No persisted favorites, starting empty");
                return;
            }
            Err(e) => {
                warn!("Failed to read persisted favorites, starting empty: {}", e);
                return;
            }
        };

        match serde_json::from_str::<Vec<FavoriteEntry>>(&payload) {
            Ok(loaded) => {
                debug!("Hydrated {} favorites", loaded.len());
                *self.entries.write().await = loaded;
            }
            Err(e) => {
                warn!("Persisted favorites are malformed, starting empty: {}", e);
            }
        }
    }

    /// Append `movie` unless an entry with the same id already exists.
    pub async fn add(&self, movie: Movie) {
        let snapshot = {
            let mut entries = self.entries.write().await;
            if entries.iter().any(|entry| entry.movie.id == movie.id) {
                debug!("Movie {} already a favorite", movie.id);
                return;
            }
            entries.push(FavoriteEntry {
                movie,
                added_at: Utc::now(),
            });
            entries.clone()
        };
        self.persist(snapshot);
    }

    /// Drop any entry with this id; absent ids are a no-op.
    pub async fn remove(&self, id: u64) {
        let snapshot = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|entry| entry.movie.id != id);
            if entries.len() == before {
                return;
            }
            entries.clone()
        };
        self.persist(snapshot);
    }

    /// Flip membership for `movie`; composed of the two primitives. Returns
    /// whether the movie is a favorite afterwards.
    pub async fn toggle(&self, movie: Movie) -> bool {
        if self.contains(movie.id).await {
            self.remove(movie.id).await;
            false
        } else {
            self.add(movie).await;
            true
        }
    }

    /// Pure in-memory lookup, no I/O.
    pub async fn contains(&self, id: u64) -> bool {
        self.entries
            .read()
            .await
            .iter()
            .any(|entry| entry.movie.id == id)
    }

    /// The set in insertion order.
    pub async fn all(&self) -> Vec<Movie> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.movie.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Empty the set and delete the durable key, so the next hydration
    /// behaves like a first run.
    pub async fn clear(&self) {
        self.entries.write().await.clear();

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.remove(FAVORITES_STORAGE_KEY).await {
                error!("Failed to remove persisted favorites: {}", e);
            }
        });
    }

    /// Write the full set through to durable storage in the background.
    fn persist(&self, snapshot: Vec<FavoriteEntry>) {
        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize favorites: {}", e);
                return;
            }
        };

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.set(FAVORITES_STORAGE_KEY, &payload).await {
                error!("Failed to persist favorites: {}", e);
            }
        });
    }
}
