// src/facts/status.rs
//! Change classification consumed from the incremental front end.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CaliperError, Result};

/// Per-file status since the previous run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    #[default]
    Unchanged,
    Added,
    Modified,
    Deleted,
    ActionChanged,
}

impl FileStatus {
    /// Returns true if previously persisted metrics for the file are stale.
    #[must_use]
    pub fn is_stale(self) -> bool {
        matches!(
            self,
            FileStatus::Modified | FileStatus::Deleted | FileStatus::ActionChanged
        )
    }
}

/// Classifier output: file path → status. Paths absent from the map are
/// reported as `Unchanged`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSet(HashMap<String, FileStatus>);

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, status: FileStatus) {
        self.0.insert(path.into(), status);
    }

    #[must_use]
    pub fn status(&self, path: &str) -> FileStatus {
        self.0.get(path).copied().unwrap_or_default()
    }

    /// Loads a classifier dump (JSON object of path → status).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| CaliperError::io(e, path))?;
        serde_json::from_str(&text)
            .map_err(|e| CaliperError::Facts(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness() {
        assert!(FileStatus::Modified.is_stale());
        assert!(FileStatus::Deleted.is_stale());
        assert!(FileStatus::ActionChanged.is_stale());
        assert!(!FileStatus::Unchanged.is_stale());
        assert!(!FileStatus::Added.is_stale());
    }

    #[test]
    fn test_unknown_path_is_unchanged() {
        let mut changes = ChangeSet::new();
        changes.set("src/a.cpp", FileStatus::Modified);
        assert_eq!(changes.status("src/a.cpp"), FileStatus::Modified);
        assert_eq!(changes.status("src/b.cpp"), FileStatus::Unchanged);
    }
}
