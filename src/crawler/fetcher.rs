//! HTTP fetcher for the question-listing endpoint
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings
//! - Assembling the paginated `/questions` request
//! - Exponential retry of failed attempts
//! - Classifying failures into retryable and fatal errors

use crate::config::{ApiConfig, ApiKey, UserAgentConfig};
use crate::crawler::clock::Sleeper;
use crate::crawler::events::{EventSink, FetchEvent};
use crate::model::QuestionsPage;
use crate::HarvestError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Attempts per page when nothing else is configured
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Upper bound on attempts per page; the last delay is then 2^14 s
pub const MAX_ATTEMPTS: u32 = 16;

/// Builds an HTTP client with proper configuration
///
/// The endpoint compresses every response, so gzip and brotli decoding are
/// always enabled.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use tag_harvest::config::UserAgentConfig;
/// use tag_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fixed parts of the `/questions` request
#[derive(Debug, Clone)]
pub struct QuestionsEndpoint {
    pub base_url: String,
    pub api_version: String,
    pub site: String,
    pub filter: String,
    pub key: Option<ApiKey>,
}

impl QuestionsEndpoint {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
            site: config.site.clone(),
            filter: config.filter.clone(),
            key: config.key.clone(),
        }
    }

    /// `{base_url}/{api_version}/questions`
    pub fn url(&self) -> Result<Url, HarvestError> {
        let raw = format!(
            "{}/{}/questions",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        );
        let url = Url::parse(&raw)?;
        if url.cannot_be_a_base() {
            return Err(HarvestError::InvalidEndpoint(raw));
        }
        Ok(url)
    }
}

/// The varying parts of one page request
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub tag: &'a str,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

/// Bound on attempts per page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first, within `1..=MAX_ATTEMPTS`
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Delay after the failed attempt with 0-based index `attempt`: 2^attempt seconds
pub fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64.checked_shl(attempt).unwrap_or(u64::MAX))
}

/// Why a single attempt did not produce a usable body
#[derive(Debug)]
enum AttemptFailure {
    Status { status: StatusCode, body: String },
    Network(reqwest::Error),
}

impl AttemptFailure {
    fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(status.as_u16()),
            Self::Network(_) => None,
        }
    }

    fn into_error(self, page: u32, attempts: u32) -> HarvestError {
        match self {
            Self::Status { status, body } => HarvestError::RetriesExhausted {
                page,
                attempts,
                status: status.as_u16(),
                body,
            },
            Self::Network(source) => HarvestError::Http { page, source },
        }
    }
}

/// Issues page requests with retry
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200, valid body | Return the page |
/// | HTTP 200, invalid body | Immediate → MalformedPayload |
/// | Any other status | Retry after 2^attempt s |
/// | Connection error / timeout | Retry after 2^attempt s |
/// | Final attempt fails | RetriesExhausted / Http |
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    endpoint: QuestionsEndpoint,
    url: Url,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(
        client: Client,
        endpoint: QuestionsEndpoint,
        policy: RetryPolicy,
    ) -> Result<Self, HarvestError> {
        let url = endpoint.url()?;
        Ok(Self {
            client,
            endpoint,
            url,
            policy,
        })
    }

    /// Fetches and decodes one page, retrying failed attempts
    ///
    /// Sleeps go through `sleeper`; no delay follows the final attempt.
    pub async fn fetch_page<S, E>(
        &self,
        request: &PageRequest<'_>,
        sleeper: &S,
        events: &E,
    ) -> Result<QuestionsPage, HarvestError>
    where
        S: Sleeper,
        E: EventSink,
    {
        let attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            let failure = match self.attempt(request).await {
                Ok(body) => return parse_page(request.page, &body),
                Err(failure) => failure,
            };

            if attempt + 1 >= attempts {
                events.emit(FetchEvent::RetriesExhausted {
                    page: request.page,
                    attempts,
                });
                return Err(failure.into_error(request.page, attempts));
            }

            let delay = retry_delay(attempt);
            events.emit(FetchEvent::RetryScheduled {
                page: request.page,
                attempt: attempt + 1,
                status: failure.status(),
                delay,
            });
            sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    /// One HTTP round trip; only a 200 with a readable body succeeds
    async fn attempt(&self, request: &PageRequest<'_>) -> Result<String, AttemptFailure> {
        let mut builder = self
            .client
            .get(self.url.clone())
            .query(&[
                ("site", self.endpoint.site.as_str()),
                ("tagged", request.tag),
            ])
            .query(&[("page", request.page), ("pagesize", request.page_size)])
            .query(&[("filter", self.endpoint.filter.as_str())]);

        if let Some(key) = &self.endpoint.key {
            builder = builder.query(&[("key", key.expose())]);
        }

        let response = builder.send().await.map_err(AttemptFailure::Network)?;
        let status = response.status();

        if status != StatusCode::OK {
            // The body is diagnostic only; an unreadable one is reported empty
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::Status { status, body });
        }

        response.text().await.map_err(AttemptFailure::Network)
    }
}

fn parse_page(page: u32, body: &str) -> Result<QuestionsPage, HarvestError> {
    serde_json::from_str(body).map_err(|source| HarvestError::MalformedPayload { page, source })
}
