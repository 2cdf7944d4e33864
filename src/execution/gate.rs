//! Decides whether a plugin's output has to be produced again

use std::fs;
use std::path::Path;

/// Re-run decision for plugin artifacts
///
/// An existing file counts as a finished run, and so does a directory with at
/// least one entry. Contents are never inspected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionGate {
    force_rerun: bool,
}

impl ExecutionGate {
    pub fn new(force_rerun: bool) -> Self {
        ExecutionGate { force_rerun }
    }

    pub fn force_rerun(&self) -> bool {
        self.force_rerun
    }

    /// Returns true when the artifact at `path` must be (re)generated
    pub fn is_run_required(&self, path: impl AsRef<Path>) -> bool {
        if self.force_rerun {
            return true;
        }

        let path = path.as_ref();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return true,
        };
        if !metadata.is_dir() {
            return false;
        }

        match fs::read_dir(path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }
}
