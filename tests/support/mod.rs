use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use rental_scout::notifier::{Notifier, NotifyError};
use rental_scout::scrapers::PageFetcher;

pub const DOMAIN: &str = "https://x.test";

/// Serves canned pages and remembers what was asked for
#[derive(Default, Clone)]
pub struct FakeSite {
    results: HashMap<(String, u32), String>,
    details: HashMap<String, String>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl FakeSite {
    pub fn with_results(mut self, city: &str, page: u32, paths: &[&str], next_page: bool) -> Self {
        let mut html = String::from("<html><body>");
        for path in paths {
            html.push_str(&format!(r#"<div data-to-posting="{path}"></div>"#));
        }
        if next_page {
            html.push_str(r#"<a aria-label="Siguiente página" href="next">›</a>"#);
        }
        html.push_str("</body></html>");
        self.results.insert((city.to_string(), page), html);
        self
    }

    pub fn with_listing(mut self, path: &str, html: String) -> Self {
        self.details.insert(format!("{DOMAIN}{path}"), html);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch_results_page(&self, city: &str, page: u32) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("results:{city}:{page}"));
        self.results
            .get(&(city.to_string(), page))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no results page {page} for {city}"))
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.details
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("challenge not solved for {url}"))
    }

    fn fetcher_name(&self) -> &'static str {
        "fake"
    }
}

/// Keeps every message instead of sending it
#[derive(Default, Clone)]
pub struct Outbox {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl Outbox {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn send(&self, body: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Rejected {
                status: 401,
                body: "Authenticate".to_string(),
            });
        }
        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

/// Minimal listing page in the site's markup
pub fn listing_page(rent: &str, condo: Option<&str>, iptu: Option<&str>, features: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><ul>");
    for (icon, value) in features {
        html.push_str(&format!(
            r#"<li class="icon-feature"><i class="{icon}"></i> {value}</li>"#
        ));
    }
    html.push_str(r#"</ul><div class="block-price-container">"#);
    html.push_str(&format!("<div>Aluguel R$ {rent}</div>"));
    if let Some(condo) = condo {
        html.push_str(&format!("<div>Condomínio R$ {condo}</div>"));
    }
    if let Some(iptu) = iptu {
        html.push_str(&format!("<div>IPTU R$ {iptu}</div>"));
    }
    html.push_str("</div></body></html>");
    html
}
