//! On-disk shape of the action catalog.
//!
//! A document is what the user edits. [`ActionsDocument::normalize`] turns it
//! into its canonical form (explicit unique ids, at most one default per
//! content kind) and [`ActionsDocument::compile`] builds the runtime
//! [`ActionConfig`] from it.

use std::collections::HashSet;
use std::path::Path;

use clipact_core::{ColorSpace, ContentKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::types::{
    Action, ActionConfig, ActionItem, ActionSubmenu, ColorAction, CommandAction, MatchPattern,
    OutputTarget, QrCodeAction,
};

/// Serialization format of an actions file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    /// `.json` files are JSON; everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Toml,
        }
    }
}

/// Fields shared by every action kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    /// Regex matched against the entry content. Absent means "match everything".
    #[serde(default, alias = "match_pattern", skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_types: Vec<ContentKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_for: Vec<ContentKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEntry {
    #[serde(flatten)]
    pub common: CommonFields,
    pub command: String,
    #[serde(default)]
    pub output: OutputTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    #[serde(flatten)]
    pub common: CommonFields,
    pub target: ColorSpace,
    #[serde(default)]
    pub output: OutputTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCodeEntry {
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuEntry {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
}

/// One element of an actions file.
///
/// Submenus may only appear at the top level; a submenu nested inside
/// another one is ignored when compiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionEntry {
    Command(CommandEntry),
    Color(ColorEntry),
    QrCode(QrCodeEntry),
    Submenu(SubmenuEntry),
}

impl ActionEntry {
    pub fn is_submenu(&self) -> bool {
        matches!(self, ActionEntry::Submenu(_))
    }

    pub fn common(&self) -> Option<&CommonFields> {
        match self {
            ActionEntry::Command(e) => Some(&e.common),
            ActionEntry::Color(e) => Some(&e.common),
            ActionEntry::QrCode(e) => Some(&e.common),
            ActionEntry::Submenu(_) => None,
        }
    }

    fn common_mut(&mut self) -> Option<&mut CommonFields> {
        match self {
            ActionEntry::Command(e) => Some(&mut e.common),
            ActionEntry::Color(e) => Some(&mut e.common),
            ActionEntry::QrCode(e) => Some(&mut e.common),
            ActionEntry::Submenu(_) => None,
        }
    }

    /// Compile a leaf entry. Returns `Ok(None)` for submenus.
    fn compile(&self) -> Result<Option<Action>, ConfigError> {
        let Some(common) = self.common() else {
            return Ok(None);
        };
        let pattern = MatchPattern::new(
            common.pattern.as_deref().unwrap_or(""),
            common.content_types.clone(),
        )
        .map_err(|e| ConfigError::InvalidPattern {
            name: common.name.clone(),
            reason: e.to_string(),
        })?;
        let id = common.id.clone().unwrap_or_default();
        let name = common.name.clone();
        let shortcut = common.shortcut.clone();
        let default_for = common.default_for.clone();

        let action = match self {
            ActionEntry::Command(e) => Action::Command(CommandAction {
                id,
                name,
                shortcut,
                pattern,
                command: e.command.clone(),
                output: e.output,
                default_for,
            }),
            ActionEntry::Color(e) => Action::Color(ColorAction {
                id,
                name,
                shortcut,
                pattern,
                target: e.target,
                output: e.output,
                default_for,
            }),
            ActionEntry::QrCode(_) => Action::QrCode(QrCodeAction {
                id,
                name,
                shortcut,
                pattern,
                default_for,
            }),
            ActionEntry::Submenu(_) => return Ok(None),
        };
        Ok(Some(action))
    }
}

/// The whole actions file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsDocument {
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
}

impl ActionsDocument {
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Toml => {
                toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    pub fn render(&self, format: DocumentFormat) -> Result<String, ConfigError> {
        match format {
            DocumentFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            DocumentFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// The catalog installed on first run.
    pub fn builtin() -> Self {
        let color = |id: &str, name: &str, target: ColorSpace, default: bool| {
            ActionEntry::Color(ColorEntry {
                common: CommonFields {
                    id: Some(id.to_string()),
                    name: name.to_string(),
                    content_types: vec![ContentKind::Color],
                    default_for: if default {
                        vec![ContentKind::Color]
                    } else {
                        vec![]
                    },
                    ..CommonFields::default()
                },
                target,
                output: OutputTarget::Copy,
            })
        };

        Self {
            actions: vec![
                ActionEntry::Submenu(SubmenuEntry {
                    name: "Convert color".to_string(),
                    actions: vec![
                        color("color-to-hex", "To HEX", ColorSpace::Hex, true),
                        color("color-to-rgb", "To RGB", ColorSpace::Rgb, false),
                        color("color-to-hsl", "To HSL", ColorSpace::Hsl, false),
                    ],
                }),
                ActionEntry::QrCode(QrCodeEntry {
                    common: CommonFields {
                        id: Some("show-qr-code".to_string()),
                        name: "Show QR code".to_string(),
                        shortcut: Some("q".to_string()),
                        pattern: Some(r"\S".to_string()),
                        ..CommonFields::default()
                    },
                }),
            ],
        }
    }

    /// Leaf entries in flattened load order.
    fn leaves_mut(&mut self) -> Vec<&mut ActionEntry> {
        let mut leaves = Vec::new();
        for item in self.actions.iter_mut() {
            match item {
                ActionEntry::Submenu(submenu) => {
                    leaves.extend(submenu.actions.iter_mut().filter(|a| !a.is_submenu()))
                }
                leaf => leaves.push(leaf),
            }
        }
        leaves
    }

    /// Bring the document into canonical form.
    ///
    /// Every leaf gets an explicit id that is unique within the document:
    /// missing ids become `action-<n>` (n = flattened index), and clashing ids
    /// get a `-2`, `-3`, ... suffix. Each content kind keeps at most one
    /// default action, the first claim in load order.
    pub fn normalize(&mut self) {
        let mut ids: HashSet<String> = HashSet::new();
        let mut claimed: HashSet<ContentKind> = HashSet::new();

        for (index, leaf) in self.leaves_mut().into_iter().enumerate() {
            let Some(common) = leaf.common_mut() else {
                continue;
            };

            let base = match common.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => format!("action-{}", index),
            };
            let mut id = base.clone();
            let mut suffix = 2;
            while ids.contains(&id) {
                id = format!("{}-{}", base, suffix);
                suffix += 1;
            }
            if common.id.as_deref().is_some_and(|given| given != id) {
                warn!(action = %common.name, id = %id, "Duplicate action id renamed");
            }
            ids.insert(id.clone());
            common.id = Some(id);

            let name = common.name.clone();
            common.default_for.retain(|kind| {
                let first = claimed.insert(*kind);
                if !first {
                    warn!(action = %name, kind = %kind, "Default already claimed by an earlier action");
                }
                first
            });
        }
    }

    /// Build the runtime catalog.
    ///
    /// Unnamed actions, actions with an invalid pattern and nested submenus
    /// are dropped with a warning; the rest of the catalog still loads.
    /// Call [`normalize`] first so every action carries its id.
    ///
    /// [`normalize`]: ActionsDocument::normalize
    pub fn compile(&self) -> ActionConfig {
        let actions = self
            .actions
            .iter()
            .filter_map(|item| match item {
                ActionEntry::Submenu(submenu) => Some(ActionItem::Submenu(ActionSubmenu {
                    name: submenu.name.clone(),
                    actions: submenu.actions.iter().filter_map(compile_leaf).collect(),
                })),
                leaf => compile_leaf(leaf).map(ActionItem::Action),
            })
            .collect();

        ActionConfig::new(actions)
    }
}

fn compile_leaf(entry: &ActionEntry) -> Option<Action> {
    if let ActionEntry::Submenu(submenu) = entry {
        warn!(submenu = %submenu.name, "Ignoring nested submenu");
        return None;
    }
    if entry.common().is_some_and(|c| c.name.trim().is_empty()) {
        warn!(id = ?entry.common().and_then(|c| c.id.as_deref()), "Skipping action without a name");
        return None;
    }
    match entry.compile() {
        Ok(action) => action,
        Err(e) => {
            warn!(error = %e, "Skipping action");
            None
        }
    }
}
