//! Action execution engine.
//!
//! Resolves an action against a content entry, executes it and routes the
//! result to the [`ActionHost`]. Command actions run as subprocesses tracked
//! in a live set so that [`ActionEngine::shutdown`] can cancel all of them.

pub mod command;
pub mod invocation;

use std::sync::Arc;

use clipact_core::config::EngineConfig;
use clipact_core::{ActionHost, Color, ContentEntry};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::matching::{find_action_by_id, find_default_action, match_captures, test};
use crate::store::ActionConfigStore;
use crate::types::{Action, ColorAction, CommandAction, OutputTarget, QrCodeAction};

pub use command::{CommandOutcome, CommandRunner};
pub use invocation::{CancelHandle, InvocationInfo, InvocationToken, LiveGuard, LiveSet};

/// Terminal state of one `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The action does not apply to the entry. Nothing ran.
    NotApplicable,
    /// A result was delivered to the host.
    Emitted(OutputTarget),
    QrCodeShown,
    /// Ran to completion without producing anything to deliver.
    NoOutput,
    /// Reported through [`ActionHost::error`].
    Failed,
    Cancelled,
    TimedOut,
    /// The engine is shutting down and no longer starts invocations.
    Rejected,
}

impl InvocationOutcome {
    /// Whether the action was found applicable and dispatched.
    pub fn was_dispatched(&self) -> bool {
        !matches!(
            self,
            InvocationOutcome::NotApplicable | InvocationOutcome::Rejected
        )
    }
}

pub struct ActionEngine {
    store: Arc<ActionConfigStore>,
    host: Arc<dyn ActionHost>,
    runner: CommandRunner,
    live: LiveSet,
}

impl ActionEngine {
    pub fn new(
        store: Arc<ActionConfigStore>,
        host: Arc<dyn ActionHost>,
        config: &EngineConfig,
    ) -> Self {
        Self::with_runner(
            store,
            host,
            CommandRunner::new(config.shell.clone(), config.command_timeout()),
        )
    }

    pub fn with_runner(
        store: Arc<ActionConfigStore>,
        host: Arc<dyn ActionHost>,
        runner: CommandRunner,
    ) -> Self {
        Self {
            store,
            host,
            runner,
            live: LiveSet::new(),
        }
    }

    pub fn store(&self) -> &Arc<ActionConfigStore> {
        &self.store
    }

    /// Run the first default action for the entry.
    /// Returns whether one was found and run.
    pub async fn activate_default_action(&self, entry: &ContentEntry) -> bool {
        let config = self.store.snapshot();
        match find_default_action(&config, entry) {
            Some(action) => self.run(entry, action).await.was_dispatched(),
            None => {
                debug!(kind = %entry.kind(), "No default action");
                false
            }
        }
    }

    /// Run the action with the given id if it applies to the entry.
    pub async fn activate_action(&self, entry: &ContentEntry, id: &str) -> bool {
        let config = self.store.snapshot();
        match find_action_by_id(&config, id) {
            Some(action) => self.run(entry, action).await.was_dispatched(),
            None => {
                debug!(id, "Unknown action id");
                false
            }
        }
    }

    /// Execute `action` for `entry`. Failures are reported to the host and
    /// folded into the outcome; this never returns an error.
    pub async fn run(&self, entry: &ContentEntry, action: &Action) -> InvocationOutcome {
        if self.live.is_closed() {
            debug!(action = %action.name(), "Engine shutting down, rejecting action");
            return InvocationOutcome::Rejected;
        }
        match action {
            Action::Command(command) => self.run_command(entry, action, command).await,
            Action::Color(color) => self.run_color(entry, action, color),
            Action::QrCode(qr) => self.run_qr_code(entry, action, qr),
        }
    }

    async fn run_command(
        &self,
        entry: &ContentEntry,
        action: &Action,
        command: &CommandAction,
    ) -> InvocationOutcome {
        let Some(captures) = match_captures(entry, action) else {
            return InvocationOutcome::NotApplicable;
        };

        let token = InvocationToken::new(&command.id, &command.name);
        let cancel = token.cancel.clone();
        let invocation = token.id;
        let _guard = match self.live.register(token) {
            Ok(guard) => guard,
            Err(_) => return InvocationOutcome::Rejected,
        };

        debug!(action = %command.name, %invocation, "Running command");
        let args = captures.get(1..).unwrap_or_default();
        match self
            .runner
            .run(&command.command, args, &entry.content, &cancel)
            .await
        {
            Ok(CommandOutcome::Completed { stdout }) => self.emit(command.output, stdout.trim()),
            Ok(CommandOutcome::TimedOut) => {
                debug!(action = %command.name, %invocation, timeout_secs = self.runner.timeout().as_secs_f64(), "Command timed out");
                InvocationOutcome::TimedOut
            }
            Ok(CommandOutcome::Cancelled) => {
                debug!(action = %command.name, %invocation, "Command cancelled");
                InvocationOutcome::Cancelled
            }
            Err(e) => {
                error!(action = %command.name, %invocation, error = %e, "Command failed");
                self.host
                    .error(format!("Action '{}' failed: {}", command.name, e));
                InvocationOutcome::Failed
            }
        }
    }

    fn run_color(
        &self,
        entry: &ContentEntry,
        action: &Action,
        color: &ColorAction,
    ) -> InvocationOutcome {
        if !test(entry, action) {
            return InvocationOutcome::NotApplicable;
        }
        match Color::parse(&entry.content) {
            Some(parsed) => self.emit(color.output, &parsed.to_string_in(color.target)),
            None => {
                debug!(action = %color.name, "Content is not a color");
                InvocationOutcome::NoOutput
            }
        }
    }

    fn run_qr_code(
        &self,
        entry: &ContentEntry,
        action: &Action,
        qr: &QrCodeAction,
    ) -> InvocationOutcome {
        if !test(entry, action) {
            return InvocationOutcome::NotApplicable;
        }
        debug!(action = %qr.name, "Showing QR code");
        self.host.show_qr_code(entry.content.clone());
        InvocationOutcome::QrCodeShown
    }

    fn emit(&self, target: OutputTarget, text: &str) -> InvocationOutcome {
        if text.is_empty() {
            return InvocationOutcome::NoOutput;
        }
        match target {
            OutputTarget::Copy => self.host.copy(text.to_string()),
            OutputTarget::Paste => self.host.paste(text.to_string()),
        }
        InvocationOutcome::Emitted(target)
    }

    /// Commands currently running, oldest first.
    pub fn live_invocations(&self) -> Vec<InvocationInfo> {
        self.live.snapshot()
    }

    /// Cancel one running invocation. Other invocations are unaffected.
    pub fn cancel(&self, id: Uuid) -> bool {
        match self.live.get(id) {
            Some(token) => {
                token.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every running command and refuse new ones.
    /// Returns the number of invocations cancelled.
    pub fn shutdown(&self) -> usize {
        let tokens = self.live.close_and_drain();
        for token in &tokens {
            token.cancel.cancel();
        }
        info!(cancelled = tokens.len(), "Action engine shut down");
        tokens.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.live.is_closed()
    }
}
