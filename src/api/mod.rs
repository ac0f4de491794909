mod client;
mod errors;
mod retry;
mod types;

#[cfg(test)]
mod tests;

pub use client::TmdbClient;
pub use errors::ApiError;
pub use retry::RetryPolicy;

use async_trait::async_trait;

use crate::models::{Category, MovieDetail, Page};

/// Transport boundary for the remote movie catalog.
///
/// Everything above this trait (caching, orchestration) is written against
/// it, so tests inject fakes instead of a live HTTP client.
#[async_trait]
pub trait MovieSource: Send + Sync + std::fmt::Debug {
    /// One page of a curated category listing. `page` is 1-indexed.
    async fn category_page(&self, category: Category, page: u32) -> Result<Page, ApiError>;

    /// One page of free-text search results. `page` is 1-indexed.
    async fn search_page(&self, query: &str, page: u32) -> Result<Page, ApiError>;

    /// Full record for a single title.
    async fn movie_detail(&self, id: u64) -> Result<MovieDetail, ApiError>;
}
