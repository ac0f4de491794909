use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::errors::ApiError;
use super::retry::RetryPolicy;
use super::types::{MovieDetailResponse, PageResponse};
use super::MovieSource;
use crate::config::{ApiConfig, NetworkConfig};
use crate::models::{Category, MovieDetail, Page};

/// HTTP client for the remote movie catalog.
///
/// One instance per configured catalog; constructed once and injected where
/// needed so tests can swap the whole transport behind [`MovieSource`].
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    retry_policy: RetryPolicy,
}

impl TmdbClient {
    pub fn new(api: &ApiConfig, network: &NetworkConfig) -> Result<Self> {
        Url::parse(&api.base_url)
            .with_context(|| format!("Invalid catalog base URL: {}", api.base_url))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network.connection_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api.api_key.clone(),
            language: api.language.clone(),
            retry_policy: RetryPolicy {
                max_attempts: network.max_retries,
                ..RetryPolicy::default()
            },
        })
    }

    /// Replace the retry policy, mainly so tests can use tiny delays.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn check_page(page: u32) -> Result<(), ApiError> {
        if page == 0 {
            Err(ApiError::Validation(format!(
                "page numbers are 1-indexed, got {}",
                page
            )))
        } else {
            Ok(())
        }
    }

    /// Execute a GET with retry and error mapping. The API key and locale
    /// ride along as query parameters on every request; the logged URL never
    /// includes them.
    async fn execute_get(
        &self,
        url: &str,
        extra_query: &[(&str, &str)],
        operation_name: &str,
    ) -> Result<reqwest::Response, ApiError> {
        self.retry_policy
            .execute(operation_name, || async {
                debug!("[{}] GET {}", operation_name, url);

                let response = self
                    .client
                    .get(url)
                    .query(&[
                        ("api_key", self.api_key.as_str()),
                        ("language", self.language.as_str()),
                    ])
                    .query(extra_query)
                    .send()
                    .await
                    .map_err(ApiError::from_reqwest)?;

                let status = response.status();
                debug!("[{}] response: {}", operation_name, status);

                if !status.is_success() {
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<failed to read response body>".to_string());
                    warn!(
                        "[{}] error response - status: {}, body: {}",
                        operation_name,
                        status.as_u16(),
                        body
                    );
                    return Err(ApiError::from_status(status.as_u16(), body));
                }

                Ok(response)
            })
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, &str)],
        operation_name: &str,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        let response = self.execute_get(&url, extra_query, operation_name).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn category_page(&self, category: Category, page: u32) -> Result<Page, ApiError> {
        Self::check_page(page)?;
        let path = category.remote_path().ok_or_else(|| {
            ApiError::Validation(format!("category {} has no remote listing", category))
        })?;

        let page_param = page.to_string();
        let response: PageResponse = self
            .get_json(path, &[("page", page_param.as_str())], "category_page")
            .await?;
        Ok(response.into())
    }

    async fn search_page(&self, query: &str, page: u32) -> Result<Page, ApiError> {
        Self::check_page(page)?;

        let page_param = page.to_string();
        let response: PageResponse = self
            .get_json(
                "search/movie",
                &[("query", query), ("page", page_param.as_str())],
                "search_page",
            )
            .await?;
        Ok(response.into())
    }

    async fn movie_detail(&self, id: u64) -> Result<MovieDetail, ApiError> {
        let response: MovieDetailResponse = self
            .get_json(&format!("movie/{}", id), &[], "movie_detail")
            .await?;
        Ok(response.into())
    }
}
