use std::pin::Pin;
use std::task::Context;
use std::time::Duration;

use futures::Future;
use futures_timer::Delay;

/// A background job run periodically on the Handler's own poll, with no
/// dedicated timer thread: eviction of timed-out commands (spec §4.C
/// `CommandTimeout`).
#[derive(Debug)]
pub(crate) struct PeriodicJob {
    interval: Duration,
    delay: Delay,
}

impl PeriodicJob {
    pub fn new(interval: Duration) -> Self {
        Self {
            delay: Delay::new(interval),
            interval,
        }
    }

    /// Returns `true` and rearms if the interval has elapsed.
    pub fn is_ready(&mut self, cx: &mut Context<'_>) -> bool {
        if Future::poll(Pin::new(&mut self.delay), cx).is_ready() {
            self.delay.reset(self.interval);
            return true;
        }
        false
    }
}

impl Default for PeriodicJob {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
