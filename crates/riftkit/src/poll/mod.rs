//! Polling with snapshot diff.
//!
//! - [`SeenSet`]: bounded, insertion-ordered set of identifiers already reported
//! - [`diff_new`]: picks the items of a fresh fetch whose identifier is new
//! - [`Poller`]: fetch, diff, emit, wait; the next fetch starts only after the
//!   previous one finished

mod poller;
mod seen;

pub use poller::{MIN_INTERVAL, PollStats, Poller};
pub use seen::{SeenSet, diff_new};

/// Items that can be diffed between polls.
pub trait Identified {
    /// Stable identifier of the item across fetches.
    fn identifier(&self) -> String;
}
