// Headless engine behind a movie-browsing UI: remote paginated catalog
// access, debounced search coordination, locally persisted favorites, and a
// reactive orchestrator tying them together. Presentation layers consume the
// orchestrator's observable properties and never talk to the transport or
// storage boundaries directly.

pub mod api;
pub mod cache;
pub mod config;
pub mod constants;
pub mod core;
pub mod models;
pub mod services;
pub mod storage;

pub use api::{ApiError, MovieSource, TmdbClient};
pub use config::Config;
pub use core::{BrowserSnapshot, BrowserViewModel, Mode};
pub use models::{Category, ImageSize, Movie, MovieDetail, Page};
pub use services::{CatalogService, FavoritesStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
