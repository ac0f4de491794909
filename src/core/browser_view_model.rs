use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::property::Property;
use crate::api::ApiError;
use crate::config::SearchConfig;
use crate::models::{Category, Movie, MovieDetail, Page};
use crate::services::{CatalogService, FavoritesStore};

/// Which data source currently feeds the item list.
///
/// Derived from the selected category and the settled search text; there is
/// no stored flag that could disagree with the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Category,
    Search,
    Favorites,
}

impl Mode {
    pub fn derive(selected: Category, debounced_search: &str) -> Mode {
        if selected == Category::Favorites {
            Mode::Favorites
        } else if !debounced_search.is_empty() {
            Mode::Search
        } else {
            Mode::Category
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ActiveQuery {
    Category(Category),
    Search(String),
}

#[derive(Debug, Clone)]
struct QueryState {
    query: ActiveQuery,
    current_page: u32,
    total_pages: u32,
}

/// Pull-style view of the observable output, for consumers that do not
/// subscribe per property.
#[derive(Debug, Clone)]
pub struct BrowserSnapshot {
    pub items: Vec<Movie>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
}

/// Drives the browsing screen: decides which source is authoritative for the
/// current category/search/favorites state, walks pages incrementally, and
/// exposes the merged result as observable properties.
///
/// All collaborators are injected; the view model owns its `QueryState` and
/// nothing else mutates it.
#[derive(Debug)]
pub struct BrowserViewModel {
    catalog: Arc<CatalogService>,
    favorites: Arc<FavoritesStore>,
    debounce_delay: Duration,

    selected_category: Property<Category>,
    search_text: Property<String>,
    debounced_search: Property<String>,
    items: Property<Vec<Movie>>,
    is_loading: Property<bool>,
    error: Property<Option<String>>,
    has_more: Property<bool>,

    state: Arc<Mutex<QueryState>>,
    /// Bumped on every query-defining transition; fetches stamped with an
    /// older value are discarded on arrival.
    generation: Arc<AtomicU64>,
    started: Arc<AtomicBool>,
    teardown: CancellationToken,
}

impl BrowserViewModel {
    pub fn new(
        catalog: Arc<CatalogService>,
        favorites: Arc<FavoritesStore>,
        search: &SearchConfig,
    ) -> Self {
        Self {
            catalog,
            favorites,
            debounce_delay: Duration::from_millis(search.debounce_ms),
            selected_category: Property::new(Category::NowPlaying, "selected_category"),
            search_text: Property::new(String::new(), "search_text"),
            debounced_search: Property::new(String::new(), "debounced_search"),
            items: Property::new(Vec::new(), "items"),
            is_loading: Property::new(false, "is_loading"),
            error: Property::new(None, "error"),
            has_more: Property::new(false, "has_more"),
            state: Arc::new(Mutex::new(QueryState {
                query: ActiveQuery::Category(Category::NowPlaying),
                current_page: 1,
                total_pages: 1,
            })),
            generation: Arc::new(AtomicU64::new(0)),
            started: Arc::new(AtomicBool::new(false)),
            teardown: CancellationToken::new(),
        }
    }

    /// Hydrate favorites, start watching the search box, and load page 1 of
    /// the initial category. Only the first call per session does anything.
    pub async fn on_start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("on_start called twice, ignoring");
            return;
        }

        self.favorites.load().await;
        self.spawn_search_watcher();

        let category = self.selected_category.get().await;
        if category == Category::Favorites {
            self.show_favorites().await;
        } else {
            self.start_query(ActiveQuery::Category(category), false).await;
        }
    }

    /// Stop observing: cancels the search watcher (and with it any pending
    /// debounce emission) and supersedes in-flight fetches. Idempotent.
    pub fn on_stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.teardown.cancel();
    }

    pub async fn select_category(&self, category: Category) {
        if self.selected_category.get().await == category {
            return;
        }
        debug!("Selecting category {}", category);
        self.selected_category.set(category).await;

        // Entering a category resets the search box; the mirror is updated
        // here as well so the late debounce emission of "" is a no-op.
        self.search_text.set(String::new()).await;
        self.debounced_search.set(String::new()).await;

        if category == Category::Favorites {
            self.show_favorites().await;
        } else {
            self.start_query(ActiveQuery::Category(category), false).await;
        }
    }

    /// Record a keystroke. Fetching waits for the text to settle for the
    /// configured debounce delay.
    pub async fn set_search_text(&self, text: impl Into<String>) {
        self.search_text.set(text.into()).await;
    }

    /// Load the next page of the active remote source, appending to the
    /// accumulated list. No-op in favorites mode, while a fetch is running,
    /// or once the last page is reached.
    pub async fn load_more(&self) {
        if self.mode().await == Mode::Favorites {
            return;
        }
        if self.is_loading.get().await {
            return;
        }

        let (query, next_page) = {
            let state = self.state.lock().await;
            if state.current_page >= state.total_pages {
                debug!("load_more past the last page, ignoring");
                return;
            }
            (state.query.clone(), state.current_page + 1)
        };

        let generation = self.generation.load(Ordering::SeqCst);
        self.is_loading.set(true).await;
        self.error.set(None).await;

        let vm = self.clone();
        tokio::spawn(async move {
            let result = vm.fetch_page(&query, next_page, false).await;
            vm.apply_fetch(generation, result, true, next_page).await;
        });
    }

    /// Re-fetch page 1 of the active remote source, bypassing the cache and
    /// replacing the accumulated list. No-op in favorites mode.
    pub async fn refresh(&self) {
        if self.mode().await == Mode::Favorites {
            return;
        }
        let query = self.state.lock().await.query.clone();
        self.start_query(query, true).await;
    }

    /// Flip membership in the favorites set. Returns whether the movie is a
    /// favorite afterwards.
    pub async fn toggle_favorite(&self, movie: Movie) -> bool {
        let now_favorite = self.favorites.toggle(movie).await;
        if self.mode().await == Mode::Favorites {
            self.items.set(self.favorites.all().await).await;
        }
        now_favorite
    }

    pub async fn is_favorite(&self, id: u64) -> bool {
        self.favorites.contains(id).await
    }

    /// Full record for the detail overlay; served from the detail cache when
    /// fresh.
    pub async fn movie_detail(&self, id: u64) -> Result<MovieDetail, ApiError> {
        self.catalog.movie_detail(id).await
    }

    pub async fn mode(&self) -> Mode {
        Mode::derive(
            self.selected_category.get().await,
            &self.debounced_search.get().await,
        )
    }

    pub async fn snapshot(&self) -> BrowserSnapshot {
        BrowserSnapshot {
            items: self.items.get().await,
            is_loading: self.is_loading.get().await,
            error: self.error.get().await,
            has_more: self.has_more.get().await,
        }
    }

    pub fn items(&self) -> &Property<Vec<Movie>> {
        &self.items
    }

    pub fn is_loading(&self) -> &Property<bool> {
        &self.is_loading
    }

    pub fn error(&self) -> &Property<Option<String>> {
        &self.error
    }

    pub fn has_more(&self) -> &Property<bool> {
        &self.has_more
    }

    pub fn selected_category(&self) -> &Property<Category> {
        &self.selected_category
    }

    pub fn search_text(&self) -> &Property<String> {
        &self.search_text
    }

    fn spawn_search_watcher(&self) {
        let debounced = self.search_text.debounce(self.debounce_delay);
        let mut subscriber = debounced.subscribe();
        let vm = self.clone();
        let teardown = self.teardown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = teardown.cancelled() => break,
                    changed = subscriber.wait_for_change() => {
                        if !changed {
                            break;
                        }
                        let text = debounced.get_sync();
                        vm.on_search_settled(text).await;
                    }
                }
            }
            // `debounced` drops here, taking any pending emission with it
        });
    }

    async fn on_search_settled(&self, text: String) {
        if text == self.debounced_search.get().await {
            return;
        }
        debug!("Search settled: {:?}", text);
        self.debounced_search.set(text.clone()).await;

        let category = self.selected_category.get().await;
        match Mode::derive(category, &text) {
            // Favorites wins over search; the settled text matters only
            // after the user leaves the favorites listing.
            Mode::Favorites => {}
            Mode::Search => self.start_query(ActiveQuery::Search(text), false).await,
            Mode::Category => {
                self.start_query(ActiveQuery::Category(category), false).await
            }
        }
    }

    async fn show_favorites(&self) {
        // Local, finite, fully loaded: supersede any in-flight fetch and
        // mirror the set as-is.
        self.generation.fetch_add(1, Ordering::SeqCst);
        let favorites = self.favorites.all().await;
        debug!("Showing {} favorites", favorites.len());

        self.items.set(favorites).await;
        self.has_more.set(false).await;
        self.is_loading.set(false).await;
        self.error.set(None).await;
    }

    /// Begin a new page-1 query. `bypass_cache` distinguishes refresh (keep
    /// the current list visible until the replacement lands) from a source
    /// change (clear stale rows immediately).
    async fn start_query(&self, query: ActiveQuery, bypass_cache: bool) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().await;
            state.query = query.clone();
            state.current_page = 1;
            state.total_pages = 1;
        }

        self.is_loading.set(true).await;
        self.error.set(None).await;
        if !bypass_cache {
            self.items.set(Vec::new()).await;
            self.has_more.set(false).await;
        }

        let vm = self.clone();
        tokio::spawn(async move {
            let result = vm.fetch_page(&query, 1, bypass_cache).await;
            vm.apply_fetch(generation, result, false, 1).await;
        });
    }

    async fn fetch_page(
        &self,
        query: &ActiveQuery,
        page: u32,
        bypass_cache: bool,
    ) -> Result<Page, ApiError> {
        match query {
            ActiveQuery::Category(category) => {
                if bypass_cache {
                    self.catalog.category_page_uncached(*category, page).await
                } else {
                    self.catalog.category_page(*category, page).await
                }
            }
            ActiveQuery::Search(text) => {
                if bypass_cache {
                    self.catalog.search_page_uncached(text, page).await
                } else {
                    self.catalog.search_page(text, page).await
                }
            }
        }
    }

    /// Fold a finished fetch into the observable state, unless a newer query
    /// superseded it while it was in flight.
    async fn apply_fetch(
        &self,
        generation: u64,
        result: Result<Page, ApiError>,
        append: bool,
        requested_page: u32,
    ) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "Discarding superseded fetch result for page {}",
                requested_page
            );
            return;
        }

        match result {
            Ok(page) => {
                {
                    let mut state = self.state.lock().await;
                    state.current_page = page.page;
                    state.total_pages = page.total_pages;
                }
                self.has_more.set(page.has_next()).await;
                if append {
                    let new_items = page.items;
                    self.items.update(|items| items.extend(new_items)).await;
                } else {
                    self.items.set(page.items).await;
                }
                self.error.set(None).await;
                self.is_loading.set(false).await;
            }
            Err(e) => {
                warn!("Fetch for page {} failed: {}", requested_page, e);
                // The page cursor was not advanced, so repeating the action
                // retries the same page; accumulated items stay untouched.
                self.error.set(Some(e.to_string())).await;
                self.is_loading.set(false).await;
            }
        }
    }
}

impl Clone for BrowserViewModel {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            favorites: self.favorites.clone(),
            debounce_delay: self.debounce_delay,
            selected_category: self.selected_category.clone(),
            search_text: self.search_text.clone(),
            debounced_search: self.debounced_search.clone(),
            items: self.items.clone(),
            is_loading: self.is_loading.clone(),
            error: self.error.clone(),
            has_more: self.has_more.clone(),
            state: self.state.clone(),
            generation: self.generation.clone(),
            started: self.started.clone(),
            teardown: self.teardown.clone(),
        }
    }
}
