use std::time::Duration;

use tracing::{debug, warn};

use super::{Identified, SeenSet, diff_new};
use crate::error::Result;
use crate::shutdown::ShutdownSignal;

/// Shortest allowed delay between two polls.
pub const MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Counters returned when a polling loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub polls: u32,
    pub failures: u32,
    pub emitted: usize,
}

/// Cooperative polling loop.
///
/// Each round fetches, diffs the result against a [`SeenSet`] and hands only
/// the new items to the caller, then sleeps for the interval. The sleep
/// starts after the fetch returns, so requests never overlap.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    report_initial: bool,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        let interval = if interval < MIN_INTERVAL {
            warn!(
                "Poll interval {:?} is below the minimum, using {:?}",
                interval, MIN_INTERVAL
            );
            MIN_INTERVAL
        } else {
            interval
        };

        Self {
            interval,
            report_initial: false,
        }
    }

    /// Report the items of the first fetch as new instead of only priming
    /// the seen set with them.
    pub fn report_initial(mut self, enabled: bool) -> Self {
        self.report_initial = enabled;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `shutdown` triggers or `fetch` fails with a non-retryable
    /// error.
    ///
    /// Retryable errors (client not running, connection refused, timeouts) are logged
    /// and the loop keeps going. A seen set that already holds identifiers,
    /// e.g. restored from disk, counts as primed.
    pub fn run<T, F, E>(
        &self,
        seen: &mut SeenSet,
        shutdown: &ShutdownSignal,
        mut fetch: F,
        mut emit: E,
    ) -> Result<PollStats>
    where
        T: Identified,
        F: FnMut() -> Result<Vec<T>>,
        E: FnMut(&[&T]),
    {
        let mut stats = PollStats::default();
        let mut primed = self.report_initial || !seen.is_empty();

        while !shutdown.is_shutdown() {
            match fetch() {
                Ok(items) => {
                    stats.polls += 1;
                    // A batch larger than the bound would evict its own ids
                    // and come back as new on every poll.
                    if seen.ensure_capacity(items.len()) {
                        debug!("Seen set now retains {} identifiers", seen.capacity());
                    }

                    let fresh = diff_new(&items, seen);
                    if primed {
                        if !fresh.is_empty() {
                            stats.emitted += fresh.len();
                            emit(&fresh);
                        }
                    } else {
                        debug!("Primed seen set with {} items", fresh.len());
                        primed = true;
                    }
                }
                Err(e) if e.is_retryable() => {
                    stats.failures += 1;
                    warn!("Poll failed, retrying in {}s: {}", self.interval.as_secs(), e);
                }
                Err(e) => return Err(e),
            }

            if shutdown.wait(self.interval) {
                break;
            }
        }

        Ok(stats)
    }
}
