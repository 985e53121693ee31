use crate::log::event::{EventLog, EventLogEntry};

/// Root every path of `log` under `/<repo_name>/`.
pub fn prefix_paths(log: &EventLog, repo_name: &str) -> EventLog {
    let entries = log
        .entries
        .iter()
        .map(|e| EventLogEntry {
            path: format!("/{repo_name}/{}", e.path.trim_start_matches('/')),
            ..e.clone()
        })
        .collect();
    EventLog::new(entries)
}

/// Concatenate `logs` and stable-sort by timestamp.
///
/// Entries sharing a timestamp keep their concatenation order, so the result is
/// deterministic for a given repository order.
pub fn merge(logs: impl IntoIterator<Item = EventLog>) -> EventLog {
    let mut entries: Vec<EventLogEntry> = logs.into_iter().flat_map(|l| l.entries).collect();
    entries.sort_by_key(|e| e.timestamp);
    EventLog::new(entries)
}

#[cfg(test)]
#[path = "../../tests/unit/log/merge.rs"]
mod tests;
