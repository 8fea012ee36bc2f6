//! Predicate and lookup logic over the action catalog.

use clipact_core::ContentEntry;

use crate::types::{Action, ActionConfig};

/// True iff the action's pattern matches the entry content and the entry's
/// kind is accepted by the action.
pub fn test(entry: &ContentEntry, action: &Action) -> bool {
    let pattern = action.pattern();
    pattern.accepts_kind(entry.kind()) && pattern.regex().is_match(&entry.content)
}

/// Captured groups of the first match, index 0 being the whole match.
///
/// Groups that did not participate in the match come back as empty strings.
/// Returns `None` exactly when [`test`] is false.
pub fn match_captures(entry: &ContentEntry, action: &Action) -> Option<Vec<String>> {
    let pattern = action.pattern();
    if !pattern.accepts_kind(entry.kind()) {
        return None;
    }
    let captures = pattern.regex().captures(&entry.content)?;
    Some(
        captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect(),
    )
}

/// True iff `action` belongs to `config`, is flagged default for the entry's
/// classification, and applies to the entry.
pub fn is_default_action(config: &ActionConfig, entry: &ContentEntry, action: &Action) -> bool {
    action.default_for().contains(&entry.kind())
        && test(entry, action)
        && config.iter_actions().any(|a| a.id() == action.id())
}

/// First action in flattened load order that is the default for the entry.
pub fn find_default_action<'a>(
    config: &'a ActionConfig,
    entry: &ContentEntry,
) -> Option<&'a Action> {
    let kind = entry.kind();
    config
        .iter_actions()
        .find(|action| action.default_for().contains(&kind) && test(entry, action))
}

/// Exact id lookup across the flattened list.
pub fn find_action_by_id<'a>(config: &'a ActionConfig, id: &str) -> Option<&'a Action> {
    config.iter_actions().find(|action| action.id() == id)
}

/// Every action applicable to the entry, in flattened load order.
pub fn applicable_actions<'a>(config: &'a ActionConfig, entry: &ContentEntry) -> Vec<&'a Action> {
    config
        .iter_actions()
        .filter(|action| test(entry, action))
        .collect()
}
