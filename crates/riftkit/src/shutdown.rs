use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use strum::Display;

/// Why a watch loop was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StopReason {
    /// Ctrl-C or SIGTERM.
    Interrupted,
    /// Esc or q on the keyboard.
    QuitKey,
    /// The command finished on its own.
    Finished,
}

#[derive(Debug, Default)]
struct State {
    reason: Mutex<Option<StopReason>>,
    wake: Condvar,
}

/// Stop flag shared by a watch command, its Ctrl-C handler and its keyboard
/// monitor. Clones refer to the same flag.
///
/// The first [`StopReason`] recorded wins; later calls to
/// [`ShutdownSignal::stop`] only wake waiters again.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    state: Arc<State>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    // The guarded value is a plain Option, so a panic elsewhere cannot leave
    // it half-written.
    fn reason_guard(&self) -> MutexGuard<'_, Option<StopReason>> {
        self.state
            .reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stop(&self, reason: StopReason) {
        let mut current = self.reason_guard();
        if current.is_none() {
            *current = Some(reason);
        }
        self.state.wake.notify_all();
    }

    pub fn reason(&self) -> Option<StopReason> {
        *self.reason_guard()
    }

    pub fn is_shutdown(&self) -> bool {
        self.reason().is_some()
    }

    /// Sleep for `duration` unless a stop arrives first.
    ///
    /// Returns `true` if the signal is stopped.
    pub fn wait(&self, duration: Duration) -> bool {
        let guard = self.reason_guard();
        let (guard, _) = self
            .state
            .wake
            .wait_timeout_while(guard, duration, |reason| reason.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.is_some()
    }
}
