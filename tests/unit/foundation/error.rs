use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        ReelError::repository("x")
            .to_string()
            .contains("repository error:")
    );
    assert!(
        ReelError::filesystem("x")
            .to_string()
            .contains("filesystem error:")
    );
}

#[test]
fn external_tool_names_stage_and_repo() {
    let err = ReelError::external_tool(Stage::Encode, Some("alpha"), "exit status: 1");
    let msg = err.to_string();
    assert_eq!(msg, "encode failed for repository 'alpha': exit status: 1");
    assert_eq!(err.repo(), Some("alpha"));
    assert_eq!(err.stage(), Some(Stage::Encode));

    let bare = ReelError::external_tool(Stage::Compose, None, "boom");
    assert_eq!(bare.to_string(), "panel composition failed: boom");
}

#[test]
fn for_repo_only_fills_missing_attribution() {
    let err = ReelError::external_tool(Stage::Render, None, "x").for_repo("bravo");
    assert_eq!(err.repo(), Some("bravo"));

    let kept = ReelError::external_tool(Stage::Log, Some("alpha"), "x").for_repo("bravo");
    assert_eq!(kept.repo(), Some("alpha"));

    let untouched = ReelError::configuration("x").for_repo("bravo");
    assert!(untouched.repo().is_none());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
