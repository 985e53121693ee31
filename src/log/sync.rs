//! Timeline synchronization: rescale each repository's history onto one shared span so
//! side-by-side and overlaid renders advance through their histories together.

use crate::{
    log::event::{Action, EventLog, EventLogEntry},
    template::registry::TemplateKind,
};

/// Calendar anchor every rescaled log starts at (2000-01-01T00:00:00Z).
pub const SYNC_BASE: i64 = 946_684_800;
/// Default sync span: one year in seconds.
pub const DEFAULT_SYNC_SPAN: i64 = 31_536_000;
/// Reserved author of synthetic marker entries.
pub const SYNC_AUTHOR: &str = "_sync_";
/// Reserved directory segment holding synthetic marker paths.
pub const SYNC_DIR: &str = ".sync";
/// Number of pulse intervals across the span.
const PULSE_DIVISIONS: i64 = 8;

/// Requested timing mode.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// `Smart` for multi-repository renders under Compare/Split/Relation templates, else `Off`.
    #[default]
    Auto,
    /// Keep real timestamps.
    #[serde(alias = "false")]
    #[value(alias = "false")]
    Off,
    /// Rescale onto the sync span.
    #[serde(alias = "true")]
    #[value(alias = "true")]
    Linear,
    /// Rescale and inject anchor/pulse markers.
    Smart,
}

impl SyncMode {
    /// Resolve `Auto` for a render of `repo_count` repositories under a template of `kind`.
    pub fn resolve(self, repo_count: usize, kind: TemplateKind) -> EffectiveSync {
        match self {
            Self::Off => EffectiveSync::Off,
            Self::Linear => EffectiveSync::Linear,
            Self::Smart => EffectiveSync::Smart,
            Self::Auto => {
                if repo_count > 1 && kind != TemplateKind::Core {
                    EffectiveSync::Smart
                } else {
                    EffectiveSync::Off
                }
            }
        }
    }
}

/// Timing mode after `Auto` has been resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveSync {
    /// Timestamps pass through unchanged.
    Off,
    /// Timestamps rescaled.
    Linear,
    /// Timestamps rescaled and markers injected.
    Smart,
}

impl EffectiveSync {
    /// `true` when timestamps are rescaled.
    pub fn is_unified(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Rescale every timestamp onto `[SYNC_BASE, SYNC_BASE + target_span]`, keeping entry order.
///
/// A log with a single distinct timestamp maps entirely onto `SYNC_BASE`.
pub fn rescale(log: &EventLog, target_span: i64) -> EventLog {
    let Some((t_min, t_max)) = log.time_bounds() else {
        return EventLog::default();
    };
    let span = (t_max - t_min).max(1) as f64;
    let target = target_span as f64;

    let entries = log
        .entries
        .iter()
        .map(|e| EventLogEntry {
            timestamp: SYNC_BASE + (((e.timestamp - t_min) as f64 / span) * target).round() as i64,
            ..e.clone()
        })
        .collect();
    EventLog::new(entries)
}

/// Synthetic anchor and pulse entries for `repo` across the span.
pub fn markers(target_span: i64, repo: &str) -> Vec<EventLogEntry> {
    let end = SYNC_BASE + target_span;
    let interval = (target_span / PULSE_DIVISIONS).max(1);
    let anchor = format!("/{repo}/{SYNC_DIR}/anchor");
    let pulse = format!("/{repo}/{SYNC_DIR}/pulse");

    let mut out = vec![
        EventLogEntry::new(SYNC_BASE, SYNC_AUTHOR, Action::Modified, anchor.clone()),
        EventLogEntry::new(end, SYNC_AUTHOR, Action::Modified, anchor),
    ];
    let mut t = SYNC_BASE + interval;
    while t < end {
        out.push(EventLogEntry::new(
            t,
            SYNC_AUTHOR,
            Action::Modified,
            pulse.clone(),
        ));
        t += interval;
    }
    out
}

/// `true` for entries produced by [`markers`].
pub fn is_marker(entry: &EventLogEntry) -> bool {
    entry.author == SYNC_AUTHOR && entry.path.split('/').any(|seg| seg == SYNC_DIR)
}

/// Apply a resolved timing mode to one repository's log.
pub fn synchronize(log: &EventLog, mode: EffectiveSync, target_span: i64, repo: &str) -> EventLog {
    match mode {
        EffectiveSync::Off => log.clone(),
        EffectiveSync::Linear => rescale(log, target_span),
        EffectiveSync::Smart => {
            let mut out = rescale(log, target_span);
            out.entries.extend(markers(target_span, repo));
            out.entries.sort_by_key(|e| e.timestamp);
            out
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/log/sync.rs"]
mod tests;
