use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use chrono::Local;
use rental_scout::config::{self, AppConfig, FetcherKind, CONFIG_FILE};
use rental_scout::notifier::{ConsoleNotifier, Notifier, TwilioNotifier};
use rental_scout::pipeline::Pipeline;
use rental_scout::run_log::{prepend_to_file, run_banner, RunLog};
use rental_scout::scrapers::{BrowserFetcher, HttpFetcher, PageFetcher};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    rental_scout::logging::init();

    if let Err(err) = try_main().await {
        error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    info!("🏠 Rental Scout");
    info!("==========================================");

    let config = config::load(Path::new(CONFIG_FILE)).context("load configuration")?;
    info!(
        "Cities: {} | Pages per city: {} | Fetcher: {:?}",
        config.cities.join(", "),
        config.max_pages,
        config.fetcher
    );

    let pipeline = Pipeline::new(build_fetcher(&config)?, build_notifier(&config)?, &config)?;

    let mut log = RunLog::new(run_banner(&Local::now()));
    let result = pipeline.run(&config.cities, &mut log).await;
    log.push_str("\n\n");

    // The run log is written even when a text message failed
    prepend_to_file(&config.log_path(), log.as_str()).context("write run log")?;
    info!("💾 Run log written to {}", config.log_path().display());

    let reports = result?;
    for report in &reports {
        info!(
            "{}: {} new, {} qualifying, {} skipped, {} already seen",
            report.city,
            report.extracted.len(),
            report.qualifying.len(),
            report.skipped.len(),
            report.already_seen
        );
    }

    Ok(())
}

fn build_fetcher(config: &AppConfig) -> anyhow::Result<Box<dyn PageFetcher>> {
    let fetcher: Box<dyn PageFetcher> = match config.fetcher {
        FetcherKind::Browser => Box::new(BrowserFetcher::new(
            config.site.clone(),
            Duration::from_secs(config.challenge_wait_secs),
        )?),
        FetcherKind::Http => Box::new(HttpFetcher::new(config.site.clone())?),
    };
    info!("Using {} fetcher", fetcher.fetcher_name());
    Ok(fetcher)
}

fn build_notifier(config: &AppConfig) -> anyhow::Result<Box<dyn Notifier>> {
    match &config.twilio {
        Some(credentials) => Ok(Box::new(TwilioNotifier::new(credentials.clone())?)),
        None => {
            info!("No Twilio account configured, messages will only be logged");
            Ok(Box::new(ConsoleNotifier))
        }
    }
}
