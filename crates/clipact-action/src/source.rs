//! Where the action catalog text comes from.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::document::DocumentFormat;
use crate::error::ConfigError;

/// Cheap change detector for a config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Backing store of the action catalog.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Raw document text, or `None` when the source does not exist yet.
    async fn read(&self) -> Result<Option<String>, ConfigError>;

    async fn write(&self, text: &str) -> Result<(), ConfigError>;

    /// `None` when the source does not exist.
    async fn fingerprint(&self) -> Option<Fingerprint>;

    fn format(&self) -> DocumentFormat;

    /// Human readable location, for logs.
    fn describe(&self) -> String;
}

/// Actions file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
    format: DocumentFormat,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = DocumentFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn read(&self) -> Result<Option<String>, ConfigError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Read(e)),
        }
    }

    async fn write(&self, text: &str) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(ConfigError::Write)?;
            }
        }
        tokio::fs::write(&self.path, text)
            .await
            .map_err(ConfigError::Write)
    }

    async fn fingerprint(&self) -> Option<Fingerprint> {
        let meta = tokio::fs::metadata(&self.path).await.ok()?;
        Some(Fingerprint {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }

    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory source, used by tests and embedders that own the catalog text.
///
/// Every write bumps a revision counter that stands in for the mtime.
#[derive(Debug)]
pub struct MemoryConfigSource {
    format: DocumentFormat,
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    text: Option<String>,
    revision: u64,
    writes: usize,
}

impl MemoryConfigSource {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn with_text(format: DocumentFormat, text: impl Into<String>) -> Self {
        let source = Self::new(format);
        source.set(text);
        source
    }

    /// Replace the text out of band, as an external editor would.
    pub fn set(&self, text: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.text = Some(text.into());
        state.revision += 1;
    }

    pub fn remove(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.text = None;
        state.revision += 1;
    }

    pub fn text(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .text
            .clone()
    }

    /// Number of writes made through [`ConfigSource::write`].
    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).writes
    }
}

#[async_trait]
impl ConfigSource for MemoryConfigSource {
    async fn read(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.text())
    }

    async fn write(&self, text: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.text = Some(text.to_string());
        state.revision += 1;
        state.writes += 1;
        Ok(())
    }

    async fn fingerprint(&self) -> Option<Fingerprint> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let text = state.text.as_ref()?;
        Some(Fingerprint {
            modified: Some(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(state.revision)),
            len: text.len() as u64,
        })
    }

    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
