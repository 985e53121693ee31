use super::*;

#[test]
fn workspace_is_removed_on_drop() {
    let root = tempfile::tempdir().unwrap();
    let ws = Workspace::create(Some(root.path())).unwrap();
    let path = ws.path().to_path_buf();
    assert!(path.starts_with(root.path()));
    std::fs::write(ws.file("scratch.txt"), "x").unwrap();
    drop(ws);
    assert!(!path.exists());
}

#[test]
fn file_names_are_sanitized() {
    let ws = Workspace::create(None).unwrap();
    let log = ws.log_file(2, "my repo/x");
    assert_eq!(log.file_name().unwrap(), "repo-2-my_repo_x.log");
    assert!(ws.clone_dir("a:b").ends_with("clone-a_b"));
}

#[cfg(unix)]
#[test]
fn fifo_is_created() {
    use std::os::unix::fs::FileTypeExt as _;

    let ws = Workspace::create(None).unwrap();
    let pipe = ws.make_fifo("frames.pipe").unwrap();
    let meta = std::fs::metadata(&pipe).unwrap();
    assert!(meta.file_type().is_fifo());
    assert!(ws.make_fifo("frames.pipe").is_err());
}
