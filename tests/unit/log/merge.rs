use std::collections::HashMap;

use super::*;
use crate::log::event::Action;

fn entry(ts: i64, author: &str, path: &str) -> EventLogEntry {
    EventLogEntry::new(ts, author, Action::Modified, path)
}

#[test]
fn prefix_roots_paths_under_repo() {
    let log = EventLog::new(vec![
        entry(1, "a", "/src/lib.rs"),
        entry(2, "b", "README.md"),
    ]);
    let out = prefix_paths(&log, "alpha");
    assert_eq!(out.entries[0].path, "/alpha/src/lib.rs");
    assert_eq!(out.entries[1].path, "/alpha/README.md");
    assert_eq!(out.entries[1].timestamp, 2);
    assert_eq!(out.entries[1].author, "b");
}

#[test]
fn merge_is_a_stable_multiset_union() {
    let a = EventLog::new(vec![entry(5, "a", "/a/1"), entry(10, "a", "/a/2"), entry(10, "a", "/a/3")]);
    let b = EventLog::new(vec![entry(1, "b", "/b/1"), entry(10, "b", "/b/2")]);
    let c = EventLog::new(vec![entry(10, "c", "/c/1"), entry(3, "c", "/c/2")]);

    let total = a.len() + b.len() + c.len();
    let merged = merge([a.clone(), b.clone(), c.clone()]);
    assert_eq!(merged.len(), total);
    assert!(merged.is_chronological());

    let mut counts: HashMap<&EventLogEntry, i32> = HashMap::new();
    for e in a.entries.iter().chain(&b.entries).chain(&c.entries) {
        *counts.entry(e).or_default() += 1;
    }
    for e in &merged.entries {
        *counts.get_mut(e).unwrap() -= 1;
    }
    assert!(counts.values().all(|&n| n == 0));

    let ties: Vec<&str> = merged
        .entries
        .iter()
        .filter(|e| e.timestamp == 10)
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(ties, vec!["/a/2", "/a/3", "/b/2", "/c/1"]);
}

#[test]
fn merge_of_nothing_is_empty() {
    assert!(merge(Vec::<EventLog>::new()).is_empty());
}
