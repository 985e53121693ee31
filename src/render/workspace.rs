use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::foundation::error::{ReelError, ReelResult};

/// Render-scoped scratch directory; removed with everything in it when dropped.
#[derive(Debug)]
pub(crate) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create under `root`, or under the system temp directory.
    pub fn create(root: Option<&Path>) -> ReelResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("commitreel-");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| {
                    ReelError::filesystem(format!(
                        "failed to create work root '{}': {e}",
                        root.display()
                    ))
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| ReelError::filesystem(format!("failed to create working area: {e}")))?;
        tracing::debug!(path = %dir.path().display(), "created working area");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Raw log file for the `index`-th repository.
    pub fn log_file(&self, index: usize, repo: &str) -> PathBuf {
        self.file(&format!("repo-{index}-{}.log", sanitize(repo)))
    }

    /// Checkout directory for a cloned remote.
    pub fn clone_dir(&self, repo: &str) -> PathBuf {
        self.file(&format!("clone-{}", sanitize(repo)))
    }

    /// Create a named pipe in the working area.
    #[cfg(unix)]
    pub fn make_fifo(&self, name: &str) -> ReelResult<PathBuf> {
        use nix::sys::stat::Mode;

        let path = self.file(name);
        nix::unistd::mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR).map_err(|e| {
            ReelError::filesystem(format!(
                "failed to create named pipe '{}': {e}",
                path.display()
            ))
        })?;
        Ok(path)
    }

    #[cfg(not(unix))]
    pub fn make_fifo(&self, name: &str) -> ReelResult<PathBuf> {
        Err(ReelError::filesystem(format!(
            "named pipe '{name}' requires a unix platform"
        )))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/workspace.rs"]
mod tests;
