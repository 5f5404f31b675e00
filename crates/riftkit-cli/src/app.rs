//! Shared setup for commands: config-derived clients and storage.

use std::thread::JoinHandle;

use anyhow::{Context, Result};
use riftkit::{
    Config, LocalClient, LockfileSource, Poller, RestClient, SeenSet, ShutdownSignal,
    SnapshotStore, StopReason,
};
use tracing::{debug, warn};

use crate::input;

pub struct App {
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn local_client(&self) -> LocalClient {
        let source = LockfileSource::with_defaults(&self.config.lockfile_paths);
        debug!("Lockfile candidates: {:?}", source.candidates());
        LocalClient::new(source, self.config.request_timeout())
    }

    pub fn rest_client(&self, base_url: &str) -> RestClient {
        RestClient::new(base_url, self.config.request_timeout())
    }

    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(self.config.data_dir())
    }

    pub fn poller(&self) -> Poller {
        Poller::new(self.config.poll_interval())
    }

    /// Shutdown signal wired to Ctrl-C and the keyboard.
    pub fn shutdown(&self) -> Result<(ShutdownSignal, JoinHandle<()>)> {
        let shutdown = ShutdownSignal::new();
        let handle = input::install_shutdown_handlers(&shutdown)
            .context("Failed to install shutdown handlers")?;
        Ok((shutdown, handle))
    }

    /// Stop the signal of a command that is done and wait for its keyboard
    /// monitor.
    pub fn finish(&self, shutdown: &ShutdownSignal, keyboard: JoinHandle<()>) {
        shutdown.stop(StopReason::Finished);
        let _ = keyboard.join();
        if let Some(reason) = shutdown.reason() {
            debug!("Stopped ({})", reason);
        }
    }

    /// Seen identifiers persisted by a previous watch run.
    pub fn load_seen(&self, name: &str) -> SeenSet {
        let capacity = self.config.seen_capacity;
        match self.store().load::<Vec<String>>(&seen_snapshot(name)) {
            Ok(Some(ids)) => SeenSet::from_ids(capacity, ids),
            Ok(None) => SeenSet::new(capacity),
            Err(e) => {
                warn!("Ignoring unreadable seen list for {}: {}", name, e);
                SeenSet::new(capacity)
            }
        }
    }

    pub fn save_seen(&self, name: &str, seen: &SeenSet) -> Result<()> {
        let ids: Vec<&String> = seen.iter().collect();
        self.store()
            .save(&seen_snapshot(name), &ids)
            .with_context(|| format!("Failed to save seen list for {}", name))?;
        Ok(())
    }
}

fn seen_snapshot(name: &str) -> String {
    format!("seen_{}", name)
}
