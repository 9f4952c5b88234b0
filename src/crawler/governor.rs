//! Backoff governor
//!
//! Holds the next request back until any cooldown the server asked for has
//! elapsed. The governor cannot fail; it can only delay.

use crate::crawler::clock::{Clock, Sleeper};
use crate::crawler::events::{EventSink, FetchEvent};
use crate::state::ClientState;
use std::time::Duration;

/// Waits out the cooldown recorded in `state`, if any is left
///
/// Returns the time spent waiting. With no cooldown recorded, or one that has
/// already elapsed, this returns `Duration::ZERO` without touching the sleeper.
pub async fn await_cooldown<C, S, E>(
    state: &ClientState,
    clock: &C,
    sleeper: &S,
    events: &E,
) -> Duration
where
    C: Clock,
    S: Sleeper,
    E: EventSink,
{
    match state.remaining_cooldown(clock.now()) {
        Some(remaining) => {
            sleeper.sleep(remaining).await;
            events.emit(FetchEvent::CooldownWaited { waited: remaining });
            remaining
        }
        None => Duration::ZERO,
    }
}
