use super::*;

const DAY: i64 = 86_400;

fn history(start: i64, days: i64, commits: i64) -> EventLog {
    let step = (days * DAY) / (commits - 1);
    EventLog::new(
        (0..commits)
            .map(|i| {
                EventLogEntry::new(
                    start + i * step,
                    "dev",
                    Action::Modified,
                    format!("/src/f{i}.rs"),
                )
            })
            .collect(),
    )
}

#[test]
fn auto_resolves_by_repo_count_and_kind() {
    assert_eq!(SyncMode::Auto.resolve(2, TemplateKind::Compare), EffectiveSync::Smart);
    assert_eq!(SyncMode::Auto.resolve(3, TemplateKind::Split), EffectiveSync::Smart);
    assert_eq!(SyncMode::Auto.resolve(2, TemplateKind::Relation), EffectiveSync::Smart);
    assert_eq!(SyncMode::Auto.resolve(2, TemplateKind::Core), EffectiveSync::Off);
    assert_eq!(SyncMode::Auto.resolve(1, TemplateKind::Compare), EffectiveSync::Off);
    assert_eq!(SyncMode::Linear.resolve(1, TemplateKind::Core), EffectiveSync::Linear);
}

#[test]
fn legacy_spellings_deserialize() {
    let m: SyncMode = serde_json::from_str("\"true\"").unwrap();
    assert_eq!(m, SyncMode::Linear);
    let m: SyncMode = serde_json::from_str("\"false\"").unwrap();
    assert_eq!(m, SyncMode::Off);
    let m: SyncMode = serde_json::from_str("\"smart\"").unwrap();
    assert_eq!(m, SyncMode::Smart);
}

#[test]
fn rescale_maps_bounds_onto_span() {
    let log = history(1_600_000_000, 10, 5);
    let out = rescale(&log, DEFAULT_SYNC_SPAN);
    assert_eq!(out.len(), 5);
    assert_eq!(out.entries[0].timestamp, SYNC_BASE);
    assert_eq!(out.entries[4].timestamp, SYNC_BASE + DEFAULT_SYNC_SPAN);
    assert_eq!(out.entries[2].timestamp, SYNC_BASE + DEFAULT_SYNC_SPAN / 2);
    assert!(out.is_chronological());
}

#[test]
fn rescale_is_idempotent() {
    let log = EventLog::new(vec![
        EventLogEntry::new(1_000, "a", Action::Added, "/a"),
        EventLogEntry::new(1_337, "a", Action::Modified, "/a"),
        EventLogEntry::new(4_999, "b", Action::Added, "/b"),
        EventLogEntry::new(7_777, "b", Action::Deleted, "/a"),
    ]);
    let once = rescale(&log, 12_345);
    let twice = rescale(&once, 12_345);
    for (a, b) in once.entries.iter().zip(&twice.entries) {
        assert!((a.timestamp - b.timestamp).abs() <= 1);
    }
}

#[test]
fn single_commit_does_not_divide_by_zero() {
    let log = EventLog::new(vec![
        EventLogEntry::new(42, "a", Action::Added, "/a"),
        EventLogEntry::new(42, "a", Action::Added, "/b"),
    ]);
    let out = rescale(&log, DEFAULT_SYNC_SPAN);
    assert!(out.entries.iter().all(|e| e.timestamp == SYNC_BASE));
    assert!(rescale(&EventLog::default(), DEFAULT_SYNC_SPAN).is_empty());
}

#[test]
fn smart_sync_aligns_short_and_long_histories() {
    let short = history(1_500_000_000, 10, 4);
    let long = history(1_200_000_000, 400, 30);
    let interval = DEFAULT_SYNC_SPAN / 8;

    for (name, log) in [("short", &short), ("long", &long)] {
        let out = synchronize(log, EffectiveSync::Smart, DEFAULT_SYNC_SPAN, name);
        assert!(out.is_chronological());
        assert_eq!(out.time_bounds(), Some((SYNC_BASE, SYNC_BASE + DEFAULT_SYNC_SPAN)));

        let marks: Vec<_> = out.entries.iter().filter(|e| is_marker(e)).collect();
        let anchors: Vec<_> = marks.iter().filter(|e| e.path.ends_with("/anchor")).collect();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].timestamp, SYNC_BASE);
        assert_eq!(anchors[1].timestamp, SYNC_BASE + DEFAULT_SYNC_SPAN);
        assert!(anchors[0].path.starts_with(&format!("/{name}/.sync/")));

        let pulses: Vec<i64> = marks
            .iter()
            .filter(|e| e.path.ends_with("/pulse"))
            .map(|e| e.timestamp)
            .collect();
        let expected: Vec<i64> = (1..8).map(|k| SYNC_BASE + k * interval).collect();
        assert_eq!(pulses, expected);
        assert_eq!(out.len(), log.len() + 9);
    }
}

#[test]
fn smart_sync_of_empty_log_still_has_markers() {
    let out = synchronize(&EventLog::default(), EffectiveSync::Smart, 80, "r");
    assert_eq!(out.len(), 9);
    assert!(out.entries.iter().all(is_marker));
}

#[test]
fn off_passes_through() {
    let log = history(7, 2, 3);
    assert_eq!(synchronize(&log, EffectiveSync::Off, 10, "r"), log);
}

#[test]
fn real_files_named_sync_are_not_markers() {
    let e = EventLogEntry::new(1, "dev", Action::Added, "/docs/.sync/notes.md");
    assert!(!is_marker(&e));
}
