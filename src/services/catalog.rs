use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::{ApiError, MovieSource};
use crate::cache::TtlCache;
use crate::config::CacheConfig;
use crate::models::{Category, MovieDetail, Page};

/// Cached access to the remote catalog.
///
/// Each kind of lookup gets its own freshness window: curated listings stay
/// usable for minutes, search results go stale faster, and per-title details
/// last the longest. A stale or missing entry falls through to the injected
/// [`MovieSource`] and re-primes the cache.
pub struct CatalogService {
    source: Arc<dyn MovieSource>,
    category_pages: Mutex<TtlCache<(Category, u32), Page>>,
    search_pages: Mutex<TtlCache<(String, u32), Page>>,
    details: Mutex<TtlCache<u64, MovieDetail>>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn MovieSource>, cache: &CacheConfig) -> Self {
        Self {
            source,
            category_pages: Mutex::new(TtlCache::new(
                cache.page_capacity,
                Duration::from_secs(cache.category_ttl_secs),
            )),
            search_pages: Mutex::new(TtlCache::new(
                cache.page_capacity,
                Duration::from_secs(cache.search_ttl_secs),
            )),
            details: Mutex::new(TtlCache::new(
                cache.detail_capacity,
                Duration::from_secs(cache.detail_ttl_secs),
            )),
        }
    }

    pub async fn category_page(&self, category: Category, page: u32) -> Result<Page, ApiError> {
        if let Some(cached) = self.category_pages.lock().await.get(&(category, page)) {
            debug!("category_page cache hit: {} page {}", category, page);
            return Ok(cached);
        }
        self.category_page_uncached(category, page).await
    }

    /// Fetch a category page from the source regardless of cache state and
    /// re-prime the cache with the result. Backs pull-to-refresh.
    pub async fn category_page_uncached(
        &self,
        category: Category,
        page: u32,
    ) -> Result<Page, ApiError> {
        let fetched = self.source.category_page(category, page).await?;
        self.category_pages
            .lock()
            .await
            .insert((category, page), fetched.clone());
        Ok(fetched)
    }

    pub async fn search_page(&self, query: &str, page: u32) -> Result<Page, ApiError> {
        let key = (query.to_string(), page);
        if let Some(cached) = self.search_pages.lock().await.get(&key) {
            debug!("search_page cache hit: {:?} page {}", query, page);
            return Ok(cached);
        }
        self.search_page_uncached(query, page).await
    }

    /// Cache-bypassing variant of [`CatalogService::search_page`].
    pub async fn search_page_uncached(&self, query: &str, page: u32) -> Result<Page, ApiError> {
        let fetched = self.source.search_page(query, page).await?;
        self.search_pages
            .lock()
            .await
            .insert((query.to_string(), page), fetched.clone());
        Ok(fetched)
    }

    pub async fn movie_detail(&self, id: u64) -> Result<MovieDetail, ApiError> {
        if let Some(cached) = self.details.lock().await.get(&id) {
            debug!("movie_detail cache hit: {}", id);
            return Ok(cached);
        }

        let fetched = self.source.movie_detail(id).await?;
        self.details.lock().await.insert(id, fetched.clone());
        Ok(fetched)
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn page(page: u32) -> Page {
            Page {
                page,
                items: Vec::new(),
                total_pages: 3,
                total_results: 60,
            }
        }
    }

    #[async_trait]
    impl MovieSource for CountingSource {
        async fn category_page(&self, _category: Category, page: u32) -> Result<Page, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::page(page))
        }

        async fn search_page(&self, _query: &str, page: u32) -> Result<Page, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::page(page))
        }

        async fn movie_detail(&self, id: u64) -> Result<MovieDetail, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MovieDetail {
                id,
                title: "cached".to_string(),
                poster_path: None,
                backdrop_path: None,
                release_date: String::new(),
                vote_average: 0.0,
                overview: None,
                runtime: None,
                tagline: None,
                genres: Vec::new(),
            })
        }
    }

    fn service(source: Arc<CountingSource>, ttl_secs: u64) -> CatalogService {
        let cache = CacheConfig {
            category_ttl_secs: ttl_secs,
            search_ttl_secs: ttl_secs,
            detail_ttl_secs: ttl_secs,
            page_capacity: 8,
            detail_capacity: 8,
        };
        CatalogService::new(source, &cache)
    }

    #[tokio::test]
    async fn repeated_lookups_inside_the_window_hit_once() {
        let source = Arc::new(CountingSource::default());
        let catalog = service(source.clone(), 60);

        catalog.category_page(Category::Popular, 1).await.unwrap();
        catalog.category_page(Category::Popular, 1).await.unwrap();
        assert_eq!(source.call_count(), 1);

        // A different page is a different key.
        catalog.category_page(Category::Popular, 2).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn stale_entries_revalidate() {
        let source = Arc::new(CountingSource::default());
        let catalog = service(source.clone(), 0);

        catalog.search_page("dune", 1).await.unwrap();
        catalog.search_page("dune", 1).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn uncached_path_always_fetches_and_reprimes() {
        let source = Arc::new(CountingSource::default());
        let catalog = service(source.clone(), 60);

        catalog.category_page(Category::Popular, 1).await.unwrap();
        catalog
            .category_page_uncached(Category::Popular, 1)
            .await
            .unwrap();
        assert_eq!(source.call_count(), 2);

        // The bypass re-primed the cache, so the cached path hits again.
        catalog.category_page(Category::Popular, 1).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn details_cache_by_id() {
        let source = Arc::new(CountingSource::default());
        let catalog = service(source.clone(), 60);

        catalog.movie_detail(603).await.unwrap();
        catalog.movie_detail(603).await.unwrap();
        catalog.movie_detail(604).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }
}
