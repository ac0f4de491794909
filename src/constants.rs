// Central tuning constants - adjust these to balance freshness vs request volume

// === Remote catalog ===
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_LANGUAGE: &str = "en-US";

// === Search ===
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

// === Cache freshness windows ===
// Curated listings change rarely, search results a little more often, and a
// single title's details almost never.
pub const CATEGORY_PAGE_TTL_SECS: u64 = 300;
pub const SEARCH_PAGE_TTL_SECS: u64 = 120;
pub const DETAIL_TTL_SECS: u64 = 600;
pub const PAGE_CACHE_CAPACITY: usize = 64;
pub const DETAIL_CACHE_CAPACITY: usize = 128;

// === Durable storage ===
pub const FAVORITES_STORAGE_KEY: &str = "favorites";
