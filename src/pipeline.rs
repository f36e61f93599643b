//! Per-city run: seen ids -> results pages -> listing pages -> store -> filter -> notify.
//!
//! Everything runs strictly in sequence; one city finishes before the next starts.

use std::collections::HashSet;

use anyhow::Context as _;
use tracing::warn;

use crate::config::AppConfig;
use crate::filter::{filter, FilterCriteria};
use crate::models::ListingRecord;
use crate::notifier::{notify, Notifier, NotifyError};
use crate::run_log::RunLog;
use crate::scrapers::{ImovelwebExtractor, PageFetcher, SearchSite};
use crate::store::SeenIdStore;

/// What happened to one listing reference
#[derive(Debug, Clone, PartialEq)]
pub enum ListingOutcome {
    Extracted(ListingRecord),
    AlreadySeen(u64),
    Skipped { url: String, reason: String },
}

/// Summary of one city's run
#[derive(Debug, Clone, Default)]
pub struct CityReport {
    pub city: String,
    pub pages_crawled: u32,
    /// Listings not seen before, in crawl order
    pub extracted: Vec<ListingRecord>,
    /// Subset of `extracted` that met the criteria
    pub qualifying: Vec<ListingRecord>,
    pub already_seen: usize,
    /// URLs that could not be fetched or parsed
    pub skipped: Vec<String>,
    pub notified: bool,
}

pub struct Pipeline {
    fetcher: Box<dyn PageFetcher>,
    notifier: Box<dyn Notifier>,
    store: SeenIdStore,
    extractor: ImovelwebExtractor,
    site: SearchSite,
    criteria: FilterCriteria,
    max_pages: u32,
}

impl Pipeline {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        notifier: Box<dyn Notifier>,
        config: &AppConfig,
    ) -> anyhow::Result<Self> {
        let extractor = ImovelwebExtractor::new().context("build listing extractor")?;

        Ok(Self {
            fetcher,
            notifier,
            store: SeenIdStore::new(&config.data_dir),
            extractor,
            site: config.site.clone(),
            criteria: config.criteria.clone(),
            max_pages: config.max_pages.max(1),
        })
    }

    /// Run every city in order.
    ///
    /// A city whose results page or id file fails is logged and left behind.
    /// A failed text message stops the whole run.
    pub async fn run(&self, cities: &[String], log: &mut RunLog) -> anyhow::Result<Vec<CityReport>> {
        let mut reports = Vec::with_capacity(cities.len());

        for city in cities {
            match self.run_city(city, log).await {
                Ok(report) => reports.push(report),
                Err(err) if err.downcast_ref::<NotifyError>().is_some() => {
                    log.record(format!("Failed to send text for {city}: {err:#}"));
                    return Err(err);
                }
                Err(err) => {
                    warn!("City run failed for {}: {:#}", city, err);
                    log.record(format!("City run failed for {city}: {err:#}"));
                }
            }
            log.push_str("\n");
        }

        Ok(reports)
    }

    pub async fn run_city(&self, city: &str, log: &mut RunLog) -> anyhow::Result<CityReport> {
        log.record(format!("Searching listings for {city}..."));

        let created = self
            .store
            .ensure(city)
            .with_context(|| format!("create id file for {city}"))?;
        if created {
            log.record(format!("Creating ID file for {city}"));
        }
        log.record(format!("Loading ID file for {city}"));
        let mut seen = self
            .store
            .load(city)
            .with_context(|| format!("load seen ids for {city}"))?;

        let mut report = CityReport {
            city: city.to_string(),
            ..CityReport::default()
        };
        let mut processed = HashSet::new();

        for page in 1..=self.max_pages {
            log.record(format!("Currently on page {page}"));
            let html = self
                .fetcher
                .fetch_results_page(city, page)
                .await
                .with_context(|| format!("fetch results page {page} for {city}"))?;
            report.pages_crawled = page;

            for path in self.extractor.detail_paths(&html) {
                let url = self.site.detail_url(&path);
                if !processed.insert(url.clone()) {
                    continue;
                }

                let outcome = self.process_listing(&url, &seen).await;
                match outcome {
                    ListingOutcome::Extracted(record) => {
                        seen.insert(record.id);
                        report.extracted.push(record);
                    }
                    ListingOutcome::AlreadySeen(_) => report.already_seen += 1,
                    ListingOutcome::Skipped { url, reason } => {
                        warn!("Skipping {}: {}", url, reason);
                        log.record(format!("ERROR WHILE TRYING TO SCRAPE: {url}"));
                        report.skipped.push(url);
                    }
                }
            }

            if !self.extractor.has_next_page(&html) {
                break;
            }
        }

        log.record(format!(
            "Number of new listings found: {}",
            report.extracted.len()
        ));

        // Ids are stored before filtering, so rejected listings are never reconsidered
        let ids: Vec<u64> = report.extracted.iter().map(|record| record.id).collect();
        self.store
            .append(city, &ids)
            .with_context(|| format!("store seen ids for {city}"))?;

        report.qualifying = filter(&report.extracted, &self.criteria);
        log.record(format!(
            "Number of new listings after filtering: {}",
            report.qualifying.len()
        ));
        for record in &report.qualifying {
            log.record(&record.url);
        }

        report.notified = notify(self.notifier.as_ref(), city, &report.qualifying)
            .await
            .with_context(|| format!("text listings for {city}"))?;
        if !report.notified {
            log.record(format!("No new listings in {city}"));
        }

        Ok(report)
    }

    /// Fetch and parse one listing, turning every failure into a skip
    pub async fn process_listing(&self, url: &str, seen: &HashSet<u64>) -> ListingOutcome {
        let id = match self.extractor.listing_id(url) {
            Ok(id) => id,
            Err(e) => return skipped(url, e),
        };
        if seen.contains(&id) {
            return ListingOutcome::AlreadySeen(id);
        }

        let html = match self.fetcher.fetch_detail_page(url).await {
            Ok(html) => html,
            Err(e) => return skipped(url, format!("{e:#}")),
        };

        match self.extractor.extract(&html, url, seen) {
            Ok(Some(record)) => ListingOutcome::Extracted(record),
            Ok(None) => ListingOutcome::AlreadySeen(id),
            Err(e) => skipped(url, e),
        }
    }
}

fn skipped(url: &str, reason: impl ToString) -> ListingOutcome {
    ListingOutcome::Skipped {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
