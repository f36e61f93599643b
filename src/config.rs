use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tracing::info;

use crate::filter::FilterCriteria;
use crate::notifier::TwilioCredentials;
use crate::scrapers::SearchSite;

/// Optional override file looked up in the working directory
pub const CONFIG_FILE: &str = "rental-scout.json";

/// How pages are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Headless Chrome, gets through the site's bot challenge
    Browser,
    /// Plain HTTP client
    Http,
}

/// Run settings. The defaults are the built-in cities, site and budget; a
/// `rental-scout.json` file in the working directory overrides any of them.
///
/// That file is also the only source of Twilio credentials. Without it (or
/// without its `twilio` section) no SMS is ever sent: messages are only
/// written to the log by `ConsoleNotifier`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cities: Vec<String>,
    pub site: SearchSite,
    pub criteria: FilterCriteria,
    /// Results pages crawled per city at most
    pub max_pages: u32,
    /// Where the `<city>.txt` id files and `log.txt` live
    pub data_dir: PathBuf,
    pub fetcher: FetcherKind,
    pub challenge_wait_secs: u64,
    pub twilio: Option<TwilioCredentials>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cities: vec![
                "indaiatuba-sp".to_string(),
                "valinhos-sp".to_string(),
                "vinhedo-sp".to_string(),
            ],
            site: SearchSite::default(),
            criteria: FilterCriteria::default(),
            max_pages: 1,
            data_dir: PathBuf::from("."),
            fetcher: FetcherKind::Browser,
            challenge_wait_secs: 8,
            twilio: None,
        }
    }
}

impl AppConfig {
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("log.txt")
    }
}

/// Read `path` if it exists; otherwise use the built-in defaults
pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    info!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&content)
        .with_context(|| format!("parse config: {}", path.display()))?;

    if config.max_pages == 0 {
        anyhow::bail!("max_pages must be at least 1");
    }

    Ok(config)
}
