use std::fmt;

/// Convenience result type used across commitreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Pipeline stage that invoked an external tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// `git clone` of a remote repository reference.
    Clone,
    /// Download of a remote logo.
    FetchLogo,
    /// Event log generation for one repository.
    Log,
    /// Visualization renderer writing frames.
    Render,
    /// Encoder reading frames and writing a video file.
    Encode,
    /// Final multi-panel composition pass.
    Compose,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clone => "clone",
            Self::FetchLogo => "logo fetch",
            Self::Log => "log generation",
            Self::Render => "render",
            Self::Encode => "encode",
            Self::Compose => "panel composition",
        })
    }
}

/// Top-level error taxonomy. Every kind is fatal to the render that raised it.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid option values, conflicting sources, unknown template, missing logo.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing repository marker, unreadable repository, empty multi-repo directory.
    #[error("repository error: {0}")]
    Repository(String),

    /// An external tool could not be spawned or exited unsuccessfully.
    #[error("{stage} failed{}: {detail}", repo_suffix(.repo))]
    ExternalTool {
        /// Stage that ran the tool.
        stage: Stage,
        /// Repository the stage was working on, if any.
        repo: Option<String>,
        /// Exit status and trimmed stderr, or the spawn error.
        detail: String,
    },

    /// Working area, named pipe, or output directory setup failed.
    #[error("filesystem error: {0}")]
    Filesystem(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn repo_suffix(repo: &Option<String>) -> String {
    repo.as_deref()
        .map(|r| format!(" for repository '{r}'"))
        .unwrap_or_default()
}

impl ReelError {
    /// Build a [`ReelError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`ReelError::Repository`] value.
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Build a [`ReelError::ExternalTool`] value.
    pub fn external_tool(stage: Stage, repo: Option<&str>, detail: impl Into<String>) -> Self {
        Self::ExternalTool {
            stage,
            repo: repo.map(str::to_owned),
            detail: detail.into(),
        }
    }

    /// Build a [`ReelError::Filesystem`] value.
    pub fn filesystem(msg: impl Into<String>) -> Self {
        Self::Filesystem(msg.into())
    }

    /// Repository an external tool failure is attributed to.
    pub fn repo(&self) -> Option<&str> {
        match self {
            Self::ExternalTool { repo, .. } => repo.as_deref(),
            _ => None,
        }
    }

    /// Stage of an external tool failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ExternalTool { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Re-attribute an external tool failure to `repo` when it has none yet.
    pub(crate) fn for_repo(self, name: &str) -> Self {
        match self {
            Self::ExternalTool {
                stage,
                repo: None,
                detail,
            } => Self::ExternalTool {
                stage,
                repo: Some(name.to_owned()),
                detail,
            },
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
