pub mod config;
pub mod filter;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod pipeline;
pub mod run_log;
pub mod scrapers;
pub mod store;
