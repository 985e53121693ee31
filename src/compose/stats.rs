//! Event-log statistics shown in legends. Synthetic sync markers are never counted.

use std::collections::BTreeMap;

use crate::log::{
    event::{Action, EventLog},
    sync::is_marker,
};

/// Label for paths without a recognizable extension.
pub const NO_EXTENSION: &str = "[no-ext]";

/// Extension label of a path's final component.
///
/// A dotfile with a single dot is labeled by its lowercase name (`.gitignore`); otherwise the
/// lowercase suffix from the last dot is used when that dot is neither first nor last in the
/// name (`.env.local` → `.local`).
pub fn extension_label(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or_default();
    if name.starts_with('.') && name.matches('.').count() == 1 {
        return name.to_lowercase();
    }
    match name.rfind('.') {
        Some(i) if i > 0 && i < name.len() - 1 => name[i..].to_lowercase(),
        _ => NO_EXTENSION.to_owned(),
    }
}

/// Sort `(label, count)` by descending count, ties by label.
fn ranked(counts: BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Most frequent extension labels, at most `limit` (minimum 1).
pub fn top_extensions(log: &EventLog, limit: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for e in log.entries.iter().filter(|e| !is_marker(e)) {
        *counts.entry(extension_label(&e.path)).or_default() += 1;
    }
    let mut out = ranked(counts);
    out.truncate(limit.max(1));
    out
}

/// Action counts ordered by descending count, ties alphabetical; zero counts omitted.
pub fn action_counts(log: &EventLog) -> Vec<(Action, usize)> {
    let real: Vec<&Action> = log
        .entries
        .iter()
        .filter(|e| !is_marker(e))
        .map(|e| &e.action)
        .collect();
    let mut out: Vec<(Action, usize)> = [Action::Added, Action::Modified, Action::Deleted]
        .into_iter()
        .map(|a| (a, real.iter().filter(|&&r| *r == a).count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.label().cmp(b.0.label())));
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/stats.rs"]
mod tests;
