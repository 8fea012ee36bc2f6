//! Live set of in-flight command invocations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::error::ActionError;

/// Cancellation signal for one invocation.
///
/// Cancelling before anyone waits is not lost: the next
/// [`cancelled`](CancelHandle::cancelled) call completes immediately.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    notify: Notify,
    cancelled: AtomicBool,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_one();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](CancelHandle::cancel) has been called.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }
}

/// One running command action.
#[derive(Debug, Clone)]
pub struct InvocationToken {
    pub id: Uuid,
    pub action_id: String,
    pub action_name: String,
    pub started_at: DateTime<Utc>,
    pub cancel: CancelHandle,
}

impl InvocationToken {
    pub fn new(action_id: impl Into<String>, action_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_id: action_id.into(),
            action_name: action_name.into(),
            started_at: Utc::now(),
            cancel: CancelHandle::new(),
        }
    }

    pub fn info(&self) -> InvocationInfo {
        InvocationInfo {
            id: self.id,
            action_id: self.action_id.clone(),
            action_name: self.action_name.clone(),
            started_at: self.started_at,
        }
    }
}

/// Read-only view of an in-flight invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationInfo {
    pub id: Uuid,
    pub action_id: String,
    pub action_name: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LiveState {
    tokens: HashMap<Uuid, InvocationToken>,
    closed: bool,
}

/// Registry of running invocations.
///
/// Once [`close_and_drain`](LiveSet::close_and_drain) has run, registration
/// fails, so no invocation can start after shutdown has taken its snapshot.
#[derive(Debug, Default, Clone)]
pub struct LiveSet {
    state: Arc<Mutex<LiveState>>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token; the returned guard removes it again when dropped.
    pub fn register(&self, token: InvocationToken) -> Result<LiveGuard, ActionError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.closed {
            return Err(ActionError::ShuttingDown);
        }
        let id = token.id;
        state.tokens.insert(id, token);
        Ok(LiveGuard {
            set: self.clone(),
            id,
        })
    }

    pub fn snapshot(&self) -> Vec<InvocationInfo> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut infos: Vec<InvocationInfo> = state.tokens.values().map(|t| t.info()).collect();
        infos.sort_by_key(|info| info.started_at);
        infos
    }

    pub fn get(&self, id: Uuid) -> Option<InvocationToken> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.tokens.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .tokens
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).closed
    }

    /// Refuse new registrations and hand back everything still registered.
    pub fn close_and_drain(&self) -> Vec<InvocationToken> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.closed = true;
        state.tokens.drain().map(|(_, token)| token).collect()
    }

    fn remove(&self, id: Uuid) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.tokens.remove(&id);
    }
}

/// Removes its invocation from the live set on every exit path.
#[derive(Debug)]
pub struct LiveGuard {
    set: LiveSet,
    id: Uuid,
}

impl LiveGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.set.remove(self.id);
    }
}
