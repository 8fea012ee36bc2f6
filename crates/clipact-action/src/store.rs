//! Action config store.
//!
//! Owns the current [`ActionConfig`] and swaps it wholesale on reload.
//! Readers take an `Arc` snapshot; every swap broadcasts exactly one
//! [`HostEvent::ActionsChanged`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use clipact_core::HostEvent;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::document::ActionsDocument;
use crate::source::ConfigSource;
use crate::types::ActionConfig;
use crate::watcher::ConfigChange;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

pub struct ActionConfigStore {
    source: Arc<dyn ConfigSource>,
    current: RwLock<Arc<ActionConfig>>,
    generation: AtomicU64,
    tx: broadcast::Sender<HostEvent>,
}

impl ActionConfigStore {
    /// Create a store holding an empty catalog. Call [`reload`] or
    /// [`replace`] to populate it.
    ///
    /// [`reload`]: ActionConfigStore::reload
    /// [`replace`]: ActionConfigStore::replace
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self::with_config(source, ActionConfig::empty())
    }

    pub fn with_config(source: Arc<dyn ConfigSource>, config: ActionConfig) -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            source,
            current: RwLock::new(Arc::new(config)),
            generation: AtomicU64::new(0),
            tx,
        }
    }

    /// Load the catalog from `source` and build a store around it.
    /// No change notification is sent for the initial load.
    pub async fn open(source: Arc<dyn ConfigSource>, persist: bool) -> Self {
        let config = Self::load(source.as_ref(), persist).await;
        Self::with_config(source, config)
    }

    /// Read, normalize and compile the catalog. Never fails.
    ///
    /// An absent source yields the built-in actions. A read or parse failure
    /// yields an empty catalog and leaves the source untouched. With
    /// `persist`, the canonical form of a successfully obtained document is
    /// written back.
    pub async fn load(source: &dyn ConfigSource, persist: bool) -> ActionConfig {
        let format = source.format();
        let mut document = match source.read().await {
            Ok(Some(text)) => match ActionsDocument::parse(&text, format) {
                Ok(document) => document,
                Err(e) => {
                    warn!(source = %source.describe(), error = %e, "Ignoring malformed actions file");
                    return ActionConfig::empty();
                }
            },
            Ok(None) => {
                info!(source = %source.describe(), "No actions file, using built-in actions");
                ActionsDocument::builtin()
            }
            Err(e) => {
                warn!(source = %source.describe(), error = %e, "Failed to read actions file");
                return ActionConfig::empty();
            }
        };

        document.normalize();

        if persist {
            match document.render(format) {
                Ok(text) => {
                    if let Err(e) = source.write(&text).await {
                        warn!(source = %source.describe(), error = %e, "Failed to persist actions");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to render actions"),
            }
        }

        let config = document.compile();
        info!(source = %source.describe(), actions = config.len(), "Actions loaded");
        config
    }

    /// The catalog as of now. Later reloads do not affect the snapshot.
    pub fn snapshot(&self) -> Arc<ActionConfig> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }

    /// Swap in a new catalog and notify subscribers once.
    pub fn replace(&self, config: ActionConfig) -> u64 {
        let generation = {
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            *current = Arc::new(config);
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        if self
            .tx
            .send(HostEvent::ActionsChanged { generation })
            .is_err()
        {
            debug!(generation, "No subscribers for actions change");
        }
        generation
    }

    /// Re-read the source (without persisting) and replace the catalog.
    pub async fn reload(&self) -> u64 {
        let config = Self::load(self.source.as_ref(), false).await;
        let generation = self.replace(config);
        info!(generation, "Actions reloaded");
        generation
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.tx.subscribe()
    }

    /// Number of replacements so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.source
    }

    /// React to a change signal. Only a completed write triggers a reload.
    /// Returns the new generation when a reload happened.
    pub async fn handle_change(&self, change: ConfigChange) -> Option<u64> {
        match change {
            ConfigChange::ChangesDone => Some(self.reload().await),
            other => {
                debug!(change = ?other, "Ignoring config change");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;
    use crate::matching::find_action_by_id;
    use crate::source::{FileConfigSource, MemoryConfigSource};
    use tokio::sync::broadcast::error::TryRecvError;

    const ONE_ACTION: &str = r#"
[[actions]]
type = "command"
id = "upper"
name = "Uppercase"
command = "tr a-z A-Z"
"#;

    const TWO_ACTIONS: &str = r#"
[[actions]]
type = "command"
id = "upper"
name = "Uppercase"
command = "tr a-z A-Z"

[[actions]]
type = "qr_code"
name = "QR"
"#;

    fn memory(text: &str) -> Arc<MemoryConfigSource> {
        Arc::new(MemoryConfigSource::with_text(DocumentFormat::Toml, text))
    }

    #[tokio::test]
    async fn test_load_absent_source_uses_builtin_and_persists() {
        let source = Arc::new(MemoryConfigSource::new(DocumentFormat::Toml));
        let config = ActionConfigStore::load(source.as_ref(), true).await;
        assert_eq!(config.len(), 4);
        assert!(find_action_by_id(&config, "show-qr-code").is_some());

        assert_eq!(source.write_count(), 1);
        let written = source.text().unwrap();
        let reparsed = ActionsDocument::parse(&written, DocumentFormat::Toml).unwrap();
        assert_eq!(reparsed, ActionsDocument::builtin());
    }

    #[tokio::test]
    async fn test_load_without_persist_never_writes() {
        let source = Arc::new(MemoryConfigSource::new(DocumentFormat::Toml));
        ActionConfigStore::load(source.as_ref(), false).await;
        assert_eq!(source.write_count(), 0);
        assert!(source.text().is_none());
    }

    #[tokio::test]
    async fn test_load_persists_canonical_ids() {
        let source = memory(TWO_ACTIONS);
        let config = ActionConfigStore::load(source.as_ref(), true).await;
        assert!(find_action_by_id(&config, "action-1").is_some());
        assert!(source.text().unwrap().contains("action-1"));
    }

    #[tokio::test]
    async fn test_malformed_file_loads_empty_and_is_not_overwritten() {
        let source = memory("this is [not toml");
        let config = ActionConfigStore::load(source.as_ref(), true).await;
        assert!(config.is_empty());
        assert_eq!(source.write_count(), 0);
        assert_eq!(source.text().as_deref(), Some("this is [not toml"));
    }

    #[tokio::test]
    async fn test_load_from_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.toml");
        std::fs::write(&path, ONE_ACTION).unwrap();

        let source = FileConfigSource::new(&path);
        let config = ActionConfigStore::load(&source, false).await;
        assert_eq!(config.len(), 1);
        assert_eq!(config.iter_actions().next().unwrap().name(), "Uppercase");
    }

    #[tokio::test]
    async fn test_replace_sends_exactly_one_notification() {
        let store = ActionConfigStore::new(memory(ONE_ACTION));
        let mut rx = store.subscribe();

        let generation = store.replace(ActionConfig::empty());
        assert_eq!(generation, 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            HostEvent::ActionsChanged { generation: 1 }
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_snapshot_is_unaffected_by_later_reload() {
        let source = memory(ONE_ACTION);
        let store = ActionConfigStore::open(source.clone(), false).await;
        let before = store.snapshot();
        assert_eq!(before.len(), 1);

        source.set(TWO_ACTIONS);
        store.reload().await;

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_only_changes_done_triggers_reload() {
        let source = memory(ONE_ACTION);
        let store = ActionConfigStore::open(source.clone(), false).await;
        let mut rx = store.subscribe();
        source.set(TWO_ACTIONS);

        for change in [
            ConfigChange::Changed,
            ConfigChange::Created,
            ConfigChange::Deleted,
        ] {
            assert!(store.handle_change(change).await.is_none());
        }
        assert_eq!(store.snapshot().len(), 1);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        assert_eq!(store.handle_change(ConfigChange::ChangesDone).await, Some(1));
        assert_eq!(store.snapshot().len(), 2);
        assert_eq!(
            rx.try_recv().unwrap(),
            HostEvent::ActionsChanged { generation: 1 }
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_reload_of_broken_file_installs_empty_config() {
        let source = memory(ONE_ACTION);
        let store = ActionConfigStore::open(source.clone(), false).await;
        let mut rx = store.subscribe();

        source.set("[[actions]]\ntype = 42");
        store.reload().await;

        assert!(store.snapshot().is_empty());
        assert!(rx.try_recv().is_ok());
        assert_eq!(
            source.text().as_deref(),
            Some("[[actions]]\ntype = 42"),
            "broken file must be left alone"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_a_partial_catalog() {
        let source = memory(ONE_ACTION);
        let store = Arc::new(ActionConfigStore::open(source.clone(), false).await);
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let stop = Arc::clone(&stop);
                tokio::spawn(async move {
                    let mut reads = 0usize;
                    loop {
                        let config = store.snapshot();
                        let ids: Vec<&str> = config.iter_actions().map(|a| a.id()).collect();
                        match config.len() {
                            1 => assert_eq!(ids, ["upper"]),
                            2 => assert_eq!(ids, ["upper", "action-1"]),
                            n => panic!("unexpected catalog size {}", n),
                        }
                        reads += 1;
                        if stop.load(std::sync::atomic::Ordering::Relaxed) {
                            break;
                        }
                        tokio::task::yield_now().await;
                    }
                    reads
                })
            })
            .collect();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for round in 0..200 {
                    source.set(if round % 2 == 0 { TWO_ACTIONS } else { ONE_ACTION });
                    store.reload().await;
                }
            })
        };

        writer.await.unwrap();
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        for reader in readers {
            assert!(reader.await.unwrap() > 0);
        }
        assert_eq!(store.generation(), 200);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_counts_replacements() {
        let store = ActionConfigStore::new(memory(ONE_ACTION));
        assert_eq!(store.generation(), 0);
        store.reload().await;
        store.reload().await;
        assert_eq!(store.generation(), 2);
    }
}
