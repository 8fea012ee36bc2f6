//! Clipboard actions for clipact.
//!
//! Loads the user's action catalog, decides which actions apply to a
//! clipboard entry, and executes them: shell commands, color conversions
//! and QR code display.

pub mod document;
pub mod engine;
pub mod error;
pub mod matching;
pub mod source;
pub mod store;
pub mod types;
pub mod watcher;

pub use document::{ActionsDocument, DocumentFormat};
pub use engine::{ActionEngine, InvocationInfo, InvocationOutcome};
pub use error::{ActionError, ConfigError};
pub use source::{ConfigSource, FileConfigSource, Fingerprint, MemoryConfigSource};
pub use store::ActionConfigStore;
pub use types::{
    Action, ActionConfig, ActionItem, ActionSubmenu, ColorAction, CommandAction, MatchPattern,
    OutputTarget, QrCodeAction,
};
pub use watcher::{ConfigChange, ConfigWatcher};
