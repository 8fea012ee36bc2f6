use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ClipactError, Result};

/// Top-level configuration for clipact.
///
/// Loaded from `~/.clipact/config.toml` by default. The action catalog itself
/// lives in a separate, user-edited file referenced by `[actions] path`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipactConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub actions: ActionsFileConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

impl ClipactConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClipactConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ClipactError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Location and first-run behavior of the action catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsFileConfig {
    /// Path to the actions file. `.json` is read as JSON, anything else as TOML.
    pub path: String,
    /// Write the built-in defaults back when the actions file does not exist yet.
    pub persist_defaults: bool,
}

impl Default for ActionsFileConfig {
    fn default() -> Self {
        Self {
            path: "~/.clipact/actions.toml".to_string(),
            persist_defaults: true,
        }
    }
}

impl ActionsFileConfig {
    /// The actions file path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.path)
    }
}

/// Action execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock limit for a single command, measured from spawn.
    pub command_timeout_secs: u64,
    /// Shell used to interpret command strings (`<shell> -c <command> _ <captures...>`).
    pub shell: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
            shell: "sh".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Actions file watching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Reload the action catalog when the file changes.
    pub enabled: bool,
    /// How often the actions file is checked for changes.
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 500,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path.starts_with("~/") || path.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&path[2..])
    } else {
        PathBuf::from(path)
    }
}
