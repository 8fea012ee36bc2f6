//! Polling watcher for the actions file.
//!
//! Emits fine-grained [`ConfigChange`]s while the source is being written and
//! a single [`ConfigChange::ChangesDone`] once it has been stable for a full
//! poll interval. The store reloads only on the latter.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info};

use crate::source::Fingerprint;
use crate::store::ActionConfigStore;

/// Change signal for the config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// Contents changed; more writes may follow.
    Changed,
    /// The source has settled after one or more changes.
    ChangesDone,
    Created,
    Deleted,
}

/// Debounce state of one watched source.
#[derive(Debug, Clone)]
pub struct PollState {
    last: Option<Fingerprint>,
    pending: bool,
}

impl PollState {
    pub fn new(initial: Option<Fingerprint>) -> Self {
        Self {
            last: initial,
            pending: false,
        }
    }

    /// Feed the fingerprint observed at one poll.
    pub fn observe(&mut self, current: Option<Fingerprint>) -> Option<ConfigChange> {
        if current != self.last {
            let change = match (self.last, current) {
                (None, Some(_)) => ConfigChange::Created,
                (Some(_), None) => ConfigChange::Deleted,
                _ => ConfigChange::Changed,
            };
            self.last = current;
            self.pending = true;
            return Some(change);
        }

        if self.pending {
            self.pending = false;
            return Some(ConfigChange::ChangesDone);
        }

        None
    }
}

/// Background loop feeding source changes into an [`ActionConfigStore`].
pub struct ConfigWatcher {
    store: Arc<ActionConfigStore>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl ConfigWatcher {
    pub fn new(store: Arc<ActionConfigStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Poll until [`shutdown`](ConfigWatcher::shutdown) is called.
    pub async fn run(&self) {
        let source = Arc::clone(self.store.source());
        let mut state = PollState::new(source.fingerprint().await);
        info!(source = %source.describe(), interval_ms = self.interval.as_millis() as u64, "Watching actions file");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.notified() => {
                    debug!("Config watcher stopped");
                    return;
                }
            }

            if let Some(change) = state.observe(source.fingerprint().await) {
                debug!(change = ?change, "Actions file change");
                self.store.handle_change(change).await;
            }
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}
