//! Pager - drives sequential page retrieval to completion
//!
//! Per page the loop moves through:
//!
//! ```text
//! Awaiting Cooldown -> Requesting -(retry)-> Requesting -> Page Received
//!        ^                   |                                  |
//!        |                   +-> Failed (attempts exhausted)     |
//!        +------------------ has_more ---------------------------+-> Done
//! ```
//!
//! There is never more than one request in flight.

use crate::crawler::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::crawler::events::{EventSink, FetchEvent, TracingSink};
use crate::crawler::fetcher::{Fetcher, PageRequest};
use crate::crawler::governor::await_cooldown;
use crate::model::{Question, QuestionsPage, Quota};
use crate::state::ClientState;
use crate::HarvestError;

/// Everything a completed harvest produced
#[derive(Debug, Clone)]
pub struct Harvest {
    /// Questions in page order, then server order within each page
    pub questions: Vec<Question>,

    /// Number of pages fetched
    pub pages: u32,

    /// State after the last page
    pub state: ClientState,
}

impl Harvest {
    pub fn quota(&self) -> Option<Quota> {
        self.state.quota
    }
}

/// Sequential pager over the question listing
///
/// The pager owns the single current [`ClientState`] and replaces it after
/// every page. It survives across [`Pager::fetch_all`] calls, so a cooldown
/// from one harvest still applies to the next one on the same pager.
pub struct Pager<C = SystemClock, S = TokioSleeper, E = TracingSink> {
    fetcher: Fetcher,
    clock: C,
    sleeper: S,
    events: E,
    state: ClientState,
}

impl Pager {
    /// Pager using the wall clock, tokio timers, and `tracing` output
    pub fn with_defaults(fetcher: Fetcher) -> Self {
        Self::new(fetcher, SystemClock, TokioSleeper, TracingSink)
    }
}

impl<C, S, E> Pager<C, S, E>
where
    C: Clock,
    S: Sleeper,
    E: EventSink,
{
    pub fn new(fetcher: Fetcher, clock: C, sleeper: S, events: E) -> Self {
        Self {
            fetcher,
            clock,
            sleeper,
            events,
            state: ClientState::new(),
        }
    }

    /// The state observed from the most recent successful page
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Fetches one page starting from `state`
    ///
    /// Waits out any cooldown in `state`, performs the request with retry, and
    /// returns the page together with the state that follows it. `state` itself
    /// is left untouched.
    pub async fn fetch_page(
        &self,
        state: &ClientState,
        request: &PageRequest<'_>,
    ) -> Result<(QuestionsPage, ClientState), HarvestError> {
        await_cooldown(state, &self.clock, &self.sleeper, &self.events).await;

        self.events.emit(FetchEvent::PageRequested {
            page: request.page,
        });
        let page = self
            .fetcher
            .fetch_page(request, &self.sleeper, &self.events)
            .await?;

        let next = state.after_page(&page, self.clock.now());
        self.events.emit(FetchEvent::PageFetched {
            page: request.page,
            items: page.items.len(),
            has_more: page.has_more,
            quota_remaining: page.quota_remaining,
            backoff: page.backoff,
        });

        Ok((page, next))
    }

    /// Fetches every page for `tag`, starting at page 1
    ///
    /// Stops when the server reports no more pages. Any error aborts the whole
    /// harvest and the questions gathered so far are dropped.
    pub async fn fetch_all(&mut self, tag: &str, page_size: u32) -> Result<Harvest, HarvestError> {
        let mut questions = Vec::new();
        let mut page_number = 1;

        loop {
            let request = PageRequest {
                tag,
                page: page_number,
                page_size,
            };
            let current = self.state;
            let (page, next) = self.fetch_page(&current, &request).await?;
            self.state = next;

            let has_more = page.has_more;
            questions.extend(page.items);

            if !has_more {
                break;
            }
            page_number += 1;
        }

        Ok(Harvest {
            questions,
            pages: page_number,
            state: self.state,
        })
    }
}
