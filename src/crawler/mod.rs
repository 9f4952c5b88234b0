//! Crawler module for paginated question fetching
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with exponential retry
//! - Honoring server-requested backoff between requests
//! - Sequential page-by-page accumulation
//! - Overall harvest coordination

pub mod clock;
mod coordinator;
pub mod events;
mod fetcher;
mod governor;
mod pager;

pub use clock::{testing, Clock, Sleeper, SystemClock, TokioSleeper};
pub use coordinator::{build_pager, run_harvest, HarvestSummary};
pub use events::{EventSink, FetchEvent, RecordingSink, TracingSink};
pub use fetcher::{
    build_http_client, retry_delay, Fetcher, PageRequest, QuestionsEndpoint, RetryPolicy,
    DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS,
};
pub use governor::await_cooldown;
pub use pager::{Harvest, Pager};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for harvesting. It will:
/// 1. Build the HTTP client
/// 2. Page through every question for the configured tag
/// 3. Append the questions to the configured store
///
/// The run is recorded with the hash of an empty configuration; use
/// [`run_harvest`] to record the hash of the file the config came from.
pub async fn harvest(config: &Config) -> Result<HarvestSummary, HarvestError> {
    run_harvest(config, &crate::config::hash_content("")).await
}
