//! Repository references to local checkouts, and checkouts to raw event logs.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    config::{options::expand_home, tools::Toolchain},
    foundation::error::{ReelError, ReelResult, Stage},
    log::event::EventLog,
    render::{
        process::{log_command, run_to_completion},
        workspace::Workspace,
    },
};

const REMOTE_PREFIXES: [&str; 5] = ["http://", "https://", "git@", "ssh://", "git://"];
const REPO_MARKER: &str = ".git";

/// A repository ready for log generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalRepo {
    /// Display name used for path prefixes, titles and legends.
    pub name: String,
    /// Checkout directory.
    pub path: PathBuf,
}

/// `true` for references that must be cloned.
pub fn is_remote(reference: &str) -> bool {
    REMOTE_PREFIXES.iter().any(|p| reference.starts_with(p))
}

/// Display name of a reference: its last path segment without a `.git` suffix.
pub fn repo_name(reference: &str) -> String {
    let trimmed = reference.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repo".to_owned()
    } else {
        name.to_owned()
    }
}

fn has_marker(path: &Path) -> bool {
    path.join(REPO_MARKER).exists()
}

/// Local checkout for `reference`, cloning remotes into `workspace`.
#[tracing::instrument(skip(tools, workspace))]
pub(crate) fn resolve(
    reference: &str,
    tools: &Toolchain,
    workspace: &Workspace,
) -> ReelResult<LocalRepo> {
    if is_remote(reference) {
        let name = repo_name(reference);
        let dest = workspace.clone_dir(&name);
        tracing::info!(%name, "cloning remote repository");
        let mut cmd = Command::new(&tools.git);
        cmd.args(["clone", "--quiet", reference]).arg(&dest);
        run_to_completion(Stage::Clone, Some(reference), &mut cmd).map_err(|e| {
            let detail = match e {
                ReelError::ExternalTool { detail, .. } => detail,
                other => other.to_string(),
            };
            ReelError::repository(format!("failed to clone '{reference}': {detail}"))
        })?;
        return Ok(LocalRepo { name, path: dest });
    }

    let expanded = expand_home(reference);
    let path = expanded.canonicalize().map_err(|e| {
        ReelError::repository(format!(
            "repository path '{}' does not exist: {e}",
            expanded.display()
        ))
    })?;
    if !has_marker(&path) {
        return Err(ReelError::repository(format!(
            "'{}' is not a repository (no {REPO_MARKER})",
            path.display()
        )));
    }
    let name = repo_name(&path.to_string_lossy());
    Ok(LocalRepo { name, path })
}

/// Repositories directly under `dir`, sorted by name. Other entries are skipped.
pub fn enumerate_repos(dir: &Path) -> ReelResult<Vec<LocalRepo>> {
    let dir = expand_home(&dir.to_string_lossy());
    let entries = std::fs::read_dir(&dir).map_err(|e| {
        ReelError::repository(format!(
            "cannot read multi-repository directory '{}': {e}",
            dir.display()
        ))
    })?;

    let mut repos = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            ReelError::repository(format!("cannot list '{}': {e}", dir.display()))
        })?;
        let path = entry.path();
        if path.is_dir() && has_marker(&path) {
            repos.push(LocalRepo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
    }
    repos.sort_by(|a, b| a.name.cmp(&b.name));

    if repos.is_empty() {
        return Err(ReelError::repository(format!(
            "no repositories found in '{}'",
            dir.display()
        )));
    }
    Ok(repos)
}

/// Generate and parse the raw event log of `repo`, written to `out`.
#[tracing::instrument(skip_all, fields(repo = %repo.name))]
pub(crate) fn collect(tools: &Toolchain, repo: &LocalRepo, out: &Path) -> ReelResult<EventLog> {
    run_to_completion(
        Stage::Log,
        Some(&repo.name),
        &mut log_command(tools, &repo.path, out),
    )?;
    let log = EventLog::read_from(out).map_err(|e| match e {
        ReelError::Repository(msg) => {
            ReelError::repository(format!("log of '{}' is malformed: {msg}", repo.name))
        }
        ReelError::Other(err) => ReelError::external_tool(
            Stage::Log,
            Some(&repo.name),
            format!("no log produced: {err:#}"),
        ),
        other => other,
    })?;
    tracing::info!(entries = log.len(), "collected event log");
    Ok(log)
}

#[cfg(test)]
#[path = "../../tests/unit/repo/collect.rs"]
mod tests;
