//! CLI argument definitions for the clipact binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use clipact_core::config::expand_home;
use clipact_core::ClipactConfig;
use std::path::PathBuf;

/// clipact: run user-defined actions on clipboard content.
#[derive(Parser, Debug)]
#[command(name = "clipact", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the actions file (overrides `[actions] path`).
    #[arg(short = 'a', long = "actions", global = true)]
    pub actions: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the action menu.
    List {
        /// Only show actions applicable to this content.
        #[arg(long)]
        content: Option<String>,

        /// Print the menu as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run an action on content given with --content or read from stdin.
    Run {
        /// Action id; the default action for the content when omitted.
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },
    /// Write the canonical actions file, creating the built-in one if absent.
    Init,
    /// Watch the actions file and reload on every settled change.
    Watch,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CLIPACT_CONFIG env var > ~/.clipact/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CLIPACT_CONFIG") {
            return PathBuf::from(p);
        }
        expand_home("~/.clipact/config.toml")
    }

    /// Resolve the actions file path.
    ///
    /// Priority: --actions flag > CLIPACT_ACTIONS env var > config file value.
    pub fn resolve_actions_path(&self, config: &ClipactConfig) -> PathBuf {
        if let Some(ref p) = self.actions {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CLIPACT_ACTIONS") {
            return PathBuf::from(p);
        }
        config.actions.resolved_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value > "info".
    pub fn resolve_log_level(&self, config: Option<&ClipactConfig>) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        config
            .map(|c| c.general.log_level.clone())
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| "info".to_string())
    }
}
