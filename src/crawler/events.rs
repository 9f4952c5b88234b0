//! Structured progress events emitted by the crawl loop
//!
//! The loop never logs directly; it reports to an [`EventSink`] and the sink
//! decides where the event goes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Something observable that happened while fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// About to request a page
    PageRequested { page: u32 },

    /// A page was received and parsed
    PageFetched {
        page: u32,
        items: usize,
        has_more: bool,
        quota_remaining: u32,
        backoff: Option<u64>,
    },

    /// An attempt failed and another will follow after `delay`
    ///
    /// `attempt` is 1-based; `status` is `None` for connection-level failures.
    RetryScheduled {
        page: u32,
        attempt: u32,
        status: Option<u16>,
        delay: Duration,
    },

    /// The final permitted attempt failed
    RetriesExhausted { page: u32, attempts: u32 },

    /// A server-requested cooldown was waited out
    CooldownWaited { waited: Duration },
}

/// Receiver for [`FetchEvent`]s
pub trait EventSink {
    fn emit(&self, event: FetchEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: FetchEvent) {
        match event {
            FetchEvent::PageRequested { page } => {
                tracing::info!("Fetching page {}...", page);
            }
            FetchEvent::PageFetched {
                page,
                items,
                has_more,
                quota_remaining,
                backoff,
            } => {
                tracing::debug!(
                    "Page {}: {} questions, has_more={}, quota_remaining={}",
                    page,
                    items,
                    has_more,
                    quota_remaining
                );
                if let Some(seconds) = backoff {
                    tracing::info!("{}s backoff requested", seconds);
                }
            }
            FetchEvent::RetryScheduled {
                page,
                attempt,
                status,
                delay,
            } => match status {
                Some(status) => tracing::warn!(
                    "Page {} attempt {} failed with status {}, waiting {}s",
                    page,
                    attempt,
                    status,
                    delay.as_secs()
                ),
                None => tracing::warn!(
                    "Page {} attempt {} failed to connect, waiting {}s",
                    page,
                    attempt,
                    delay.as_secs()
                ),
            },
            FetchEvent::RetriesExhausted { page, attempts } => {
                tracing::error!(
                    "Page {} failed {} times, max number of attempts reached",
                    page,
                    attempts
                );
            }
            FetchEvent::CooldownWaited { waited } => {
                tracing::info!("Waited {:.3}s for requested backoff", waited.as_secs_f64());
            }
        }
    }
}

/// Keeps every event in memory, in emission order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<FetchEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events emitted so far
    pub fn events(&self) -> Vec<FetchEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: FetchEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
