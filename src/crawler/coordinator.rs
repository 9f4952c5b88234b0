//! Harvest coordinator - end-to-end orchestration
//!
//! Wires the pager to production time sources and logging, runs it to
//! completion, and appends the result to the configured store.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher, QuestionsEndpoint, RetryPolicy};
use crate::crawler::pager::Pager;
use crate::model::Quota;
use crate::storage::{open_store, CrawlBatch, CrawlReceipt, QuestionStore};
use crate::HarvestError;
use chrono::Utc;
use std::path::Path;
use std::time::Duration;

/// Outcome of a harvest that was fetched and stored
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub tag: String,
    pub questions: usize,
    pub pages: u32,
    pub quota: Option<Quota>,
    pub receipt: CrawlReceipt,
}

/// Builds a production pager from configuration
pub fn build_pager(config: &Config) -> Result<Pager, HarvestError> {
    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.api.request_timeout_secs),
    )?;
    let fetcher = Fetcher::new(
        client,
        QuestionsEndpoint::from_config(&config.api),
        RetryPolicy::new(config.api.max_attempts),
    )?;
    Ok(Pager::with_defaults(fetcher))
}

/// Fetches every page for the configured tag and appends it to the store
///
/// The store is only opened once fetching has succeeded, so a failed harvest
/// leaves previously stored questions exactly as they were.
pub async fn run_harvest(config: &Config, config_hash: &str) -> Result<HarvestSummary, HarvestError> {
    let tag = config.crawl.tag.as_str();
    if config.api.key.is_some() {
        tracing::info!("Using API key");
    }

    let mut pager = build_pager(config)?;

    tracing::info!("Fetching questions tagged '{}'...", tag);
    let harvest = pager.fetch_all(tag, config.api.page_size).await?;
    let crawl_date = Utc::now();

    tracing::info!(
        "Done fetching {} questions across {} pages",
        harvest.questions.len(),
        harvest.pages
    );
    if let Some(quota) = harvest.quota() {
        tracing::info!("Quota remaining: {}/{}", quota.remaining, quota.max);
    }

    let database_path = Path::new(&config.output.database_path);
    tracing::info!("Writing questions to storage '{}'...", database_path.display());
    let mut store = open_store(database_path)?;

    let questions = harvest.questions.len();
    let batch = CrawlBatch {
        tag: tag.to_string(),
        crawl_date,
        config_hash: config_hash.to_string(),
        quota: harvest.quota(),
        questions: harvest.questions,
    };
    let receipt = store.record_crawl(&batch)?;

    tracing::info!(
        "Done writing questions: {} previously stored, {} total",
        receipt.previous_count,
        receipt.total
    );

    Ok(HarvestSummary {
        tag: batch.tag,
        questions,
        pages: harvest.pages,
        quota: batch.quota,
        receipt,
    })
}
