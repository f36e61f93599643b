use anyhow::Result;
use async_trait::async_trait;

/// Retrieves rendered HTML from the listings site.
/// Implementations must get past whatever bot gate the site puts in front of its pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of search results for `city` (pages start at 1)
    async fn fetch_results_page(&self, city: &str, page: u32) -> Result<String>;

    /// Fetch a single listing page
    async fn fetch_detail_page(&self, url: &str) -> Result<String>;

    /// Get the name of the fetcher
    fn fetcher_name(&self) -> &'static str;
}
