//! Host-facing events and the output boundary of the action engine.
//!
//! The engine never touches the clipboard, a paste injector or a dialog
//! itself. It calls an [`ActionHost`], and the host decides what `copy`,
//! `paste` and "show a QR code" mean on its platform.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Everything the engine and the config store report to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum HostEvent {
    /// Place the string on the system clipboard.
    Copy(String),
    /// Inject the string as a paste into the focused window.
    Paste(String),
    /// Present a modal showing the content as a QR code.
    ShowQrCode(String),
    /// A failure worth reporting (failed command, dispatch error).
    Error(String),
    /// The action catalog was replaced; cached views should re-sync.
    ActionsChanged { generation: u64 },
}

impl HostEvent {
    /// Returns the snake_case event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            HostEvent::Copy(_) => "copy",
            HostEvent::Paste(_) => "paste",
            HostEvent::ShowQrCode(_) => "show_qr_code",
            HostEvent::Error(_) => "error",
            HostEvent::ActionsChanged { .. } => "actions_changed",
        }
    }
}

/// Output boundary implemented by the host application.
pub trait ActionHost: Send + Sync {
    fn copy(&self, text: String);

    fn paste(&self, text: String);

    fn show_qr_code(&self, content: String);

    /// Logging sink for failed commands and dispatch errors.
    fn error(&self, message: String) {
        tracing::error!(message = %message, "Action failed");
    }
}

/// [`ActionHost`] that forwards every call as a [`HostEvent`] on a channel.
#[derive(Clone, Debug)]
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelHost {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: HostEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Host event receiver dropped");
        }
    }
}

impl ActionHost for ChannelHost {
    fn copy(&self, text: String) {
        self.send(HostEvent::Copy(text));
    }

    fn paste(&self, text: String) {
        self.send(HostEvent::Paste(text));
    }

    fn show_qr_code(&self, content: String) {
        self.send(HostEvent::ShowQrCode(content));
    }

    fn error(&self, message: String) {
        tracing::error!(message = %message, "Action failed");
        self.send(HostEvent::Error(message));
    }
}
