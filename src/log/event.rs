use std::{fmt, path::Path, str::FromStr};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Kind of change recorded for a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// `A`
    Added,
    /// `M`
    Modified,
    /// `D`
    Deleted,
}

impl Action {
    /// Single-letter code used in the log format.
    pub fn code(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
        }
    }

    /// Lowercase word used in legends.
    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for Action {
    type Err = ReelError;

    fn from_str(s: &str) -> ReelResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::Added),
            "M" => Ok(Self::Modified),
            "D" => Ok(Self::Deleted),
            other => Err(ReelError::repository(format!(
                "unknown log action '{other}'"
            ))),
        }
    }
}

/// One change record: `timestamp|author|action|path`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventLogEntry {
    /// Unix seconds.
    pub timestamp: i64,
    /// Commit author as reported by the log generator.
    pub author: String,
    /// Change kind.
    pub action: Action,
    /// Repository-relative path, rooted at `/`.
    pub path: String,
}

impl EventLogEntry {
    /// Build an entry.
    pub fn new(
        timestamp: i64,
        author: impl Into<String>,
        action: Action,
        path: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            author: author.into(),
            action,
            path: path.into(),
        }
    }

    /// Parse one log line. The path is everything after the third `|`.
    pub fn parse_line(line: &str) -> ReelResult<Self> {
        let mut parts = line.splitn(4, '|');
        let (Some(ts), Some(author), Some(action), Some(path)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ReelError::repository(format!(
                "malformed log line (expected 4 '|' fields): '{line}'"
            )));
        };
        let timestamp = ts.trim().parse::<i64>().map_err(|e| {
            ReelError::repository(format!("malformed log timestamp '{ts}': {e}"))
        })?;
        Ok(Self {
            timestamp,
            author: author.to_owned(),
            action: action.parse()?,
            path: path.trim_end_matches(['\r', '\n']).to_owned(),
        })
    }
}

impl fmt::Display for EventLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.timestamp,
            self.author,
            self.action.code(),
            self.path
        )
    }
}

/// Ordered sequence of change records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    /// Entries in log order.
    pub entries: Vec<EventLogEntry>,
}

impl EventLog {
    /// Wrap entries without reordering them.
    pub fn new(entries: Vec<EventLogEntry>) -> Self {
        Self { entries }
    }

    /// Parse the text format. Blank lines are skipped.
    pub fn parse(text: &str) -> ReelResult<Self> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = EventLogEntry::parse_line(line).map_err(|e| match e {
                ReelError::Repository(msg) => {
                    ReelError::repository(format!("line {}: {msg}", idx + 1))
                }
                other => other,
            })?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Read and parse a log file. Invalid UTF-8 is replaced, not rejected.
    pub fn read_from(path: &Path) -> ReelResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read event log '{}'", path.display()))?;
        Self::parse(&String::from_utf8_lossy(&bytes)).map_err(|e| match e {
            ReelError::Repository(msg) => {
                ReelError::repository(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Serialize to the text format, one entry per line.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.entries.len() * 48);
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// Write the text format to `path`.
    pub fn write_to(&self, path: &Path) -> ReelResult<()> {
        std::fs::write(path, self.to_text()).map_err(|e| {
            ReelError::filesystem(format!("write event log '{}': {e}", path.display()))
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the log has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest and largest timestamp, if any.
    pub fn time_bounds(&self) -> Option<(i64, i64)> {
        let mut iter = self.entries.iter().map(|e| e.timestamp);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// `true` when timestamps never decrease.
    pub fn is_chronological(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/log/event.rs"]
mod tests;
