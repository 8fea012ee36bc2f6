//! Presentation adapter: turns the action catalog into a menu tree and keeps
//! it in sync with the config store.

use std::fmt::Write as _;
use std::sync::Arc;

use clipact_action::matching::{find_default_action, test};
use clipact_action::{Action, ActionConfig, ActionConfigStore, ActionItem};
use clipact_core::{ContentEntry, HostEvent};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuItem {
    Action {
        id: String,
        label: String,
        shortcut: Option<String>,
        is_default: bool,
    },
    Submenu {
        label: String,
        items: Vec<MenuItem>,
    },
}

/// Build the menu for `config`.
///
/// With an entry, only applicable actions are listed and the entry's default
/// action is marked. Submenus left without items are omitted.
pub fn build_menu(config: &ActionConfig, entry: Option<&ContentEntry>) -> Vec<MenuItem> {
    let default_id = entry
        .and_then(|e| find_default_action(config, e))
        .map(|a| a.id().to_string());

    let item = |action: &Action| -> Option<MenuItem> {
        if let Some(entry) = entry {
            if !test(entry, action) {
                return None;
            }
        }
        Some(MenuItem::Action {
            id: action.id().to_string(),
            label: action.name().to_string(),
            shortcut: action.shortcut().map(str::to_string),
            is_default: default_id.as_deref() == Some(action.id()),
        })
    };

    config
        .actions
        .iter()
        .filter_map(|entry_item| match entry_item {
            ActionItem::Action(action) => item(action),
            ActionItem::Submenu(submenu) => {
                let items: Vec<MenuItem> = submenu.actions.iter().filter_map(item).collect();
                (!items.is_empty()).then(|| MenuItem::Submenu {
                    label: submenu.name.clone(),
                    items,
                })
            }
        })
        .collect()
}

/// Indented text rendering, one item per line.
pub fn render_menu(items: &[MenuItem]) -> String {
    fn render(out: &mut String, items: &[MenuItem], depth: usize) {
        for item in items {
            let indent = "  ".repeat(depth);
            match item {
                MenuItem::Action {
                    id,
                    label,
                    shortcut,
                    is_default,
                } => {
                    let marker = if *is_default { "*" } else { " " };
                    let _ = write!(out, "{}{} {} [{}]", indent, marker, label, id);
                    if let Some(key) = shortcut {
                        let _ = write!(out, " ({})", key);
                    }
                    out.push('\n');
                }
                MenuItem::Submenu { label, items } => {
                    let _ = writeln!(out, "{}  {}:", indent, label);
                    render(out, items, depth + 1);
                }
            }
        }
    }

    let mut out = String::new();
    render(&mut out, items, 0);
    out
}

/// Holds the current menu and rebuilds it whenever the store changes.
pub struct MenuAdapter {
    store: Arc<ActionConfigStore>,
    rx: broadcast::Receiver<HostEvent>,
    entry: Option<ContentEntry>,
    items: Vec<MenuItem>,
}

impl MenuAdapter {
    pub fn new(store: Arc<ActionConfigStore>) -> Self {
        let rx = store.subscribe();
        let items = build_menu(&store.snapshot(), None);
        Self {
            store,
            rx,
            entry: None,
            items,
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Show the menu for a new clipboard entry.
    pub fn set_entry(&mut self, entry: Option<ContentEntry>) {
        self.entry = entry;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.items = build_menu(&self.store.snapshot(), self.entry.as_ref());
        debug!(items = self.items.len(), "Menu rebuilt");
    }

    /// Wait for the next catalog change and rebuild.
    /// Returns the new generation, or `None` once the store is gone.
    pub async fn next_change(&mut self) -> Option<u64> {
        loop {
            match self.rx.recv().await {
                Ok(HostEvent::ActionsChanged { generation }) => {
                    self.rebuild();
                    return Some(generation);
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Menu adapter lagged behind action changes");
                    self.rebuild();
                    return Some(self.store.generation());
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Apply pending changes without waiting. Returns whether the menu was rebuilt.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(HostEvent::ActionsChanged { .. }) | Err(TryRecvError::Lagged(_)) => {
                    changed = true
                }
                Ok(_) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        if changed {
            self.rebuild();
        }
        changed
    }
}
