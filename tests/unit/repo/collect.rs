use super::*;

fn make_repo(root: &Path, name: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::create_dir_all(path.join(".git")).unwrap();
    path
}

#[test]
fn remote_references() {
    for r in [
        "https://github.com/o/r.git",
        "http://host/r",
        "git@github.com:o/r.git",
        "ssh://git@host/r",
        "git://host/r",
    ] {
        assert!(is_remote(r), "{r}");
    }
    assert!(!is_remote("/home/me/r"));
    assert!(!is_remote("~/r"));
}

#[test]
fn names_from_references() {
    assert_eq!(repo_name("https://github.com/o/widget.git"), "widget");
    assert_eq!(repo_name("git@github.com:o/widget.git"), "widget");
    assert_eq!(repo_name("git@host:widget.git"), "widget");
    assert_eq!(repo_name("/srv/src/widget/"), "widget");
    assert_eq!(repo_name("/"), "repo");
}

#[test]
fn enumerate_skips_non_repositories_and_sorts() {
    let root = tempfile::tempdir().unwrap();
    make_repo(root.path(), "zeta");
    make_repo(root.path(), "alpha");
    std::fs::create_dir(root.path().join("plain")).unwrap();
    std::fs::write(root.path().join("notes.txt"), "x").unwrap();

    let repos = enumerate_repos(root.path()).unwrap();
    let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["alpha", "zeta"]);
    assert!(repos[0].path.ends_with("alpha"));
}

#[test]
fn enumerate_rejects_empty_and_missing_directories() {
    let root = tempfile::tempdir().unwrap();
    let err = enumerate_repos(root.path()).unwrap_err();
    assert!(matches!(err, ReelError::Repository(_)), "{err}");

    let err = enumerate_repos(&root.path().join("missing")).unwrap_err();
    assert!(err.to_string().contains("cannot read"), "{err}");
}

#[test]
fn resolve_local_paths() {
    let root = tempfile::tempdir().unwrap();
    let ws = Workspace::create(None).unwrap();
    let tools = Toolchain::default();

    let repo = make_repo(root.path(), "widget");
    let local = resolve(&repo.to_string_lossy(), &tools, &ws).unwrap();
    assert_eq!(local.name, "widget");
    assert_eq!(local.path, repo.canonicalize().unwrap());

    std::fs::create_dir(root.path().join("bare")).unwrap();
    let err = resolve(&root.path().join("bare").to_string_lossy(), &tools, &ws).unwrap_err();
    assert!(err.to_string().contains("not a repository"), "{err}");

    let err = resolve(&root.path().join("nope").to_string_lossy(), &tools, &ws).unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err}");
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt as _;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn collect_parses_generated_log() {
        let bin = tempfile::tempdir().unwrap();
        let ws = Workspace::create(None).unwrap();
        let tools = Toolchain {
            gource: script(
                bin.path(),
                "gource",
                "printf '10|ann|A|/a.rs\\n20|bob|M|/a.rs\\n' > \"$2\"",
            ),
            ..Toolchain::default()
        };
        let repo = LocalRepo {
            name: "widget".into(),
            path: bin.path().to_path_buf(),
        };
        let log = collect(&tools, &repo, &ws.log_file(0, "widget")).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.time_bounds(), Some((10, 20)));
    }

    #[test]
    fn collect_failure_names_repository() {
        let bin = tempfile::tempdir().unwrap();
        let ws = Workspace::create(None).unwrap();
        let tools = Toolchain {
            gource: script(bin.path(), "gource", "echo 'not a repo' >&2; exit 1"),
            ..Toolchain::default()
        };
        let repo = LocalRepo {
            name: "broken".into(),
            path: bin.path().to_path_buf(),
        };
        let err = collect(&tools, &repo, &ws.log_file(0, "broken")).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Log));
        assert_eq!(err.repo(), Some("broken"));
        assert!(err.to_string().contains("not a repo"), "{err}");
    }

    #[test]
    fn clone_failure_names_reference() {
        let bin = tempfile::tempdir().unwrap();
        let ws = Workspace::create(None).unwrap();
        let tools = Toolchain {
            git: script(bin.path(), "git", "echo 'fatal: unreachable' >&2; exit 128"),
            ..Toolchain::default()
        };
        let err = resolve("https://example.invalid/o/r.git", &tools, &ws).unwrap_err();
        match err {
            ReelError::Repository(msg) => {
                assert!(
                    msg.contains("failed to clone 'https://example.invalid/o/r.git'"),
                    "{msg}"
                );
                assert!(msg.contains("fatal: unreachable"), "{msg}");
            }
            other => panic!("expected repository error, got {other:?}"),
        }
    }
}
