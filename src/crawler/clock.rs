//! Time sources for the crawl loop
//!
//! Both the cooldown wait and the retry delay go through these traits so the
//! loop can run against a virtual clock.

use std::future::Future;
use std::time::{Duration, Instant};

/// Source of monotonic timestamps
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Suspends the current task for a duration
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Virtual time for driving the crawl loop deterministically
///
/// [`ManualClock`] only moves when advanced; [`RecordingSleeper`] records each
/// requested sleep and advances its clock instead of waiting.
pub mod testing {
    use super::*;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clock that only moves when told to
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<Instant>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Arc::new(Mutex::new(Instant::now())),
            }
        }

        /// Moves the clock forward; an advance past the representable range
        /// leaves it where it is
        pub fn advance(&self, by: Duration) {
            let mut now = lock(&self.now);
            if let Some(next) = now.checked_add(by) {
                *now = next;
            }
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *lock(&self.now)
        }
    }

    /// Records requested sleeps and advances the paired clock instead of waiting
    #[derive(Debug, Clone)]
    pub struct RecordingSleeper {
        clock: ManualClock,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        pub fn new(clock: ManualClock) -> Self {
            Self {
                clock,
                sleeps: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Every sleep requested so far, in order
        pub fn sleeps(&self) -> Vec<Duration> {
            lock(&self.sleeps).clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
            lock(&self.sleeps).push(duration);
            self.clock.advance(duration);
            std::future::ready(())
        }
    }
}
