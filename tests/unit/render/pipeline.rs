use super::*;
use crate::template::registry::lookup;

#[test]
fn multi_panel_needs_split_template_directory_and_enough_repos() {
    let dir = Source::Multi("/srv/repos".into());
    let single = Source::Single("/srv/repos/a".into());
    let quad = lookup("split-quad").unwrap();
    let vertical = lookup("split-vertical").unwrap();
    let compare = lookup("compare-panel").unwrap();

    assert_eq!(
        Strategy::choose(quad, &dir, 4),
        Strategy::MultiPanel { panels: 4 }
    );
    assert_eq!(
        Strategy::choose(quad, &dir, 7),
        Strategy::MultiPanel { panels: 4 }
    );
    assert_eq!(Strategy::choose(quad, &dir, 3), Strategy::SingleStream);
    assert_eq!(Strategy::choose(quad, &single, 1), Strategy::SingleStream);
    assert_eq!(
        Strategy::choose(vertical, &dir, 2),
        Strategy::MultiPanel { panels: 2 }
    );
    assert_eq!(Strategy::choose(compare, &dir, 5), Strategy::SingleStream);
}

#[test]
fn report_serializes_strategy_with_tag() {
    let report = RenderReport {
        output: "out.mp4".into(),
        strategy: Strategy::MultiPanel { panels: 2 },
        sync: EffectiveSync::Smart,
        repos: vec!["a".into(), "b".into()],
        warnings: Vec::new(),
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["strategy"]["kind"], "multi_panel");
    assert_eq!(json["strategy"]["panels"], 2);
    assert_eq!(json["sync"], "smart");
}
