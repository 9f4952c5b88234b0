use crate::model::{QuestionsPage, Quota};
use std::time::{Duration, Instant};

/// A server-requested cooldown anchored to the request that asked for it
///
/// The backoff and the timestamp it is measured from only exist together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    /// When the page carrying the backoff was received
    pub requested_at: Instant,

    /// Minimum delay before the next request
    pub backoff: Duration,
}

impl Cooldown {
    /// Instant at which the next request becomes allowed
    ///
    /// `None` when the backoff reaches past what `Instant` can represent.
    pub fn ready_at(&self) -> Option<Instant> {
        self.requested_at.checked_add(self.backoff)
    }

    /// Backoff left at `now`; saturates instead of overflowing
    pub fn remaining(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.requested_at);
        self.backoff.saturating_sub(elapsed)
    }
}

/// Client state observed from the most recent successful page
///
/// Values are never mutated in place; every page produces a new state via
/// [`ClientState::after_page`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientState {
    /// Last reported quota, unset until the first page arrives
    pub quota: Option<Quota>,

    /// Outstanding cooldown, if the last page requested one
    pub cooldown: Option<Cooldown>,
}

impl ClientState {
    /// Creates a state with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the state that follows a successfully parsed page
    ///
    /// A page without a backoff clears any previous cooldown.
    pub fn after_page(&self, page: &QuestionsPage, requested_at: Instant) -> Self {
        Self {
            quota: Some(page.quota()),
            cooldown: page.backoff_duration().map(|backoff| Cooldown {
                requested_at,
                backoff,
            }),
        }
    }

    /// Time left before the next request may be sent
    ///
    /// Returns `None` when no cooldown is recorded or it has already elapsed.
    pub fn remaining_cooldown(&self, now: Instant) -> Option<Duration> {
        let remaining = self.cooldown?.remaining(now);
        if remaining.is_zero() {
            None
        } else {
            Some(remaining)
        }
    }

    pub fn quota_remaining(&self) -> Option<u32> {
        self.quota.map(|q| q.remaining)
    }
}
