use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::SearchSite;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP fetcher. Only works against hosts that do not gate bots.
pub struct HttpFetcher {
    client: Client,
    site: SearchSite,
}

impl HttpFetcher {
    pub fn new(site: SearchSite) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, site })
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_results_page(&self, city: &str, page: u32) -> Result<String> {
        let url = self.site.results_url(city, page);
        self.get(&url).await
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<String> {
        self.get(url).await
    }

    fn fetcher_name(&self) -> &'static str {
        "http"
    }
}
