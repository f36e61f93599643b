use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::SearchSite;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Browser-based fetcher using headless Chrome.
///
/// The listings site answers plain HTTP clients with a browser-fingerprinting
/// challenge. A real Chrome instance solves it by itself, so every page is
/// loaded in a fresh tab and the rendered DOM is read back once the gate has
/// had time to clear.
pub struct BrowserFetcher {
    browser: Arc<Browser>,
    site: SearchSite,
    challenge_wait: Duration,
}

impl BrowserFetcher {
    /// Launch headless Chrome
    pub fn new(site: SearchSite, challenge_wait: Duration) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser: Arc::new(browser),
            site,
            challenge_wait,
        })
    }

    /// Load `url` in a new tab and return the rendered document
    async fn render(&self, url: String) -> Result<String> {
        let browser = Arc::clone(&self.browser);
        let wait = self.challenge_wait;

        tokio::task::spawn_blocking(move || render_blocking(&browser, &url, wait))
            .await
            .context("Browser task panicked")?
    }
}

fn render_blocking(browser: &Browser, url: &str, wait: Duration) -> Result<String> {
    debug!("Opening {}", url);
    let tab = browser.new_tab().context("Failed to open browser tab")?;

    tab.navigate_to(url)
        .with_context(|| format!("Failed to navigate to {url}"))?;
    tab.wait_until_navigated()
        .with_context(|| format!("Navigation to {url} did not complete"))?;

    // Let the challenge script run and redirect to the real page
    thread::sleep(wait);

    let html_result = tab
        .evaluate("document.documentElement.outerHTML", false)
        .with_context(|| format!("Failed to read page HTML from {url}"))?;
    let html = html_result
        .value
        .as_ref()
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_default();

    if let Err(e) = tab.close(true) {
        warn!("Failed to close tab for {}: {}", url, e);
    }

    if html.is_empty() {
        anyhow::bail!("Page HTML is empty: {url}");
    }

    debug!("Rendered {} bytes from {}", html.len(), url);
    Ok(html)
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_results_page(&self, city: &str, page: u32) -> Result<String> {
        let url = self.site.results_url(city, page);
        self.render(url).await
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<String> {
        self.render(url.to_string()).await
    }

    fn fetcher_name(&self) -> &'static str {
        "headless-chrome"
    }
}
