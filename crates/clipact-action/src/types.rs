//! Action model: the loaded, validated form of the action catalog.
//!
//! The on-disk shape lives in [`crate::document`]; everything here has
//! already been normalized (ids assigned, defaults deduplicated, patterns
//! compiled) and is immutable once built.

use clipact_core::{ColorSpace, ContentKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enums
// =============================================================================

/// Which host channel receives an action's result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTarget {
    #[default]
    Copy,
    Paste,
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Copy => write!(f, "copy"),
            OutputTarget::Paste => write!(f, "paste"),
        }
    }
}

// =============================================================================
// Match pattern
// =============================================================================

/// Applicability predicate of an action.
///
/// The regex is matched against the entry content; its groups double as
/// positional arguments for commands. A non-empty `content_types` list
/// additionally restricts the action to those entry kinds.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    regex: Regex,
    content_types: Vec<ContentKind>,
}

impl MatchPattern {
    pub fn new(pattern: &str, content_types: Vec<ContentKind>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            content_types,
        })
    }

    /// A pattern that matches every entry.
    pub fn always() -> Self {
        Self {
            regex: Regex::new("").expect("Empty regex is valid"),
            content_types: Vec::new(),
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn content_types(&self) -> &[ContentKind] {
        &self.content_types
    }

    pub fn accepts_kind(&self, kind: ContentKind) -> bool {
        self.content_types.is_empty() || self.content_types.contains(&kind)
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Runs `sh -c <command> _ <captures...>` with the entry content on stdin.
#[derive(Debug, Clone)]
pub struct CommandAction {
    pub id: String,
    pub name: String,
    pub shortcut: Option<String>,
    pub pattern: MatchPattern,
    pub command: String,
    pub output: OutputTarget,
    pub default_for: Vec<ContentKind>,
}

/// Re-renders a color entry in another notation.
#[derive(Debug, Clone)]
pub struct ColorAction {
    pub id: String,
    pub name: String,
    pub shortcut: Option<String>,
    pub pattern: MatchPattern,
    pub target: ColorSpace,
    pub output: OutputTarget,
    pub default_for: Vec<ContentKind>,
}

/// Presents the entry content as a QR code.
#[derive(Debug, Clone)]
pub struct QrCodeAction {
    pub id: String,
    pub name: String,
    pub shortcut: Option<String>,
    pub pattern: MatchPattern,
    pub default_for: Vec<ContentKind>,
}

/// An executable action.
#[derive(Debug, Clone)]
pub enum Action {
    Command(CommandAction),
    Color(ColorAction),
    QrCode(QrCodeAction),
}

impl Action {
    pub fn id(&self) -> &str {
        match self {
            Action::Command(a) => &a.id,
            Action::Color(a) => &a.id,
            Action::QrCode(a) => &a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Action::Command(a) => &a.name,
            Action::Color(a) => &a.name,
            Action::QrCode(a) => &a.name,
        }
    }

    pub fn shortcut(&self) -> Option<&str> {
        match self {
            Action::Command(a) => a.shortcut.as_deref(),
            Action::Color(a) => a.shortcut.as_deref(),
            Action::QrCode(a) => a.shortcut.as_deref(),
        }
    }

    pub fn pattern(&self) -> &MatchPattern {
        match self {
            Action::Command(a) => &a.pattern,
            Action::Color(a) => &a.pattern,
            Action::QrCode(a) => &a.pattern,
        }
    }

    pub fn default_for(&self) -> &[ContentKind] {
        match self {
            Action::Command(a) => &a.default_for,
            Action::Color(a) => &a.default_for,
            Action::QrCode(a) => &a.default_for,
        }
    }

    /// Output channel, `None` for actions that only cause a side effect.
    pub fn output(&self) -> Option<OutputTarget> {
        match self {
            Action::Command(a) => Some(a.output),
            Action::Color(a) => Some(a.output),
            Action::QrCode(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::Command(_) => "command",
            Action::Color(_) => "color",
            Action::QrCode(_) => "qr_code",
        }
    }
}

/// A named group of actions. Presentation only: never executed, never default.
#[derive(Debug, Clone)]
pub struct ActionSubmenu {
    pub name: String,
    pub actions: Vec<Action>,
}

/// One element of the top-level action list.
#[derive(Debug, Clone)]
pub enum ActionItem {
    Action(Action),
    Submenu(ActionSubmenu),
}

/// The loaded action catalog, in load order.
#[derive(Debug, Clone, Default)]
pub struct ActionConfig {
    pub actions: Vec<ActionItem>,
}

impl ActionConfig {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(actions: Vec<ActionItem>) -> Self {
        Self { actions }
    }

    /// Every executable action in load order, with submenus expanded in place.
    pub fn iter_actions(&self) -> impl Iterator<Item = &Action> + '_ {
        self.actions.iter().flat_map(|item| match item {
            ActionItem::Action(action) => std::slice::from_ref(action).iter(),
            ActionItem::Submenu(submenu) => submenu.actions.iter(),
        })
    }

    pub fn flatten(&self) -> Vec<&Action> {
        self.iter_actions().collect()
    }

    /// Number of executable actions.
    pub fn len(&self) -> usize {
        self.iter_actions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
