use super::*;

#[test]
fn parses_generator_lines() {
    let e = EventLogEntry::parse_line("1700000000|Ada Lovelace|A|/src/main.rs").unwrap();
    assert_eq!(e.timestamp, 1_700_000_000);
    assert_eq!(e.author, "Ada Lovelace");
    assert_eq!(e.action, Action::Added);
    assert_eq!(e.path, "/src/main.rs");
    assert_eq!(e.to_string(), "1700000000|Ada Lovelace|A|/src/main.rs");
}

#[test]
fn path_keeps_extra_pipes() {
    let e = EventLogEntry::parse_line("5|bob|m|/weird|name.txt").unwrap();
    assert_eq!(e.action, Action::Modified);
    assert_eq!(e.path, "/weird|name.txt");
}

#[test]
fn malformed_lines_report_line_number() {
    let err = EventLog::parse("1|a|A|/x\n\nnot a log line\n").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("line 3"), "{msg}");

    let err = EventLog::parse("1|a|X|/x\n").unwrap_err();
    assert!(err.to_string().contains("unknown log action"));

    let err = EventLog::parse("soon|a|A|/x\n").unwrap_err();
    assert!(err.to_string().contains("timestamp"));
}

#[test]
fn text_round_trip_skips_blank_lines() {
    let text = "3|a|A|/x\n\n1|b|D|/y\n";
    let log = EventLog::parse(text).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.to_text(), "3|a|A|/x\n1|b|D|/y\n");
    assert_eq!(log.time_bounds(), Some((1, 3)));
    assert!(!log.is_chronological());
    assert!(EventLog::default().time_bounds().is_none());
}

#[test]
fn write_and_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dev.log");
    let log = EventLog::new(vec![
        EventLogEntry::new(1, "a", Action::Added, "/a"),
        EventLogEntry::new(2, "b", Action::Deleted, "/b"),
    ]);
    log.write_to(&path).unwrap();
    assert_eq!(EventLog::read_from(&path).unwrap(), log);
}

#[test]
fn read_replaces_invalid_utf8_in_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.log");
    std::fs::write(&path, b"10|ann|A|/caf\xff.txt\n20|bob|M|/ok.rs\n").unwrap();

    let log = EventLog::read_from(&path).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.entries[0].path, "/caf\u{fffd}.txt");
    assert_eq!(log.entries[1].author, "bob");
}
