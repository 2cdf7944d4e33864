//! Custom error types for Vola-Auto

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

/// Main error type for plugin execution, artifact collection and dumping
#[derive(Error, Debug)]
pub enum VolaError {
    #[error("Artifact not found: {path}: {source}")]
    MissingArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {field} identifier: {value:?}")]
    MalformedIdentifier { field: &'static str, value: String },

    #[error("Command `{command}` failed with {status}")]
    SubprocessFailed { command: String, status: ExitStatus },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty offset to dump file {0}")]
    EmptyOffset(String),

    #[error("{0}")]
    Aggregated(DumpFailures),

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Walking {path} failed: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for Vola-Auto operations
pub type VolaResult<T> = Result<T, VolaError>;

impl VolaError {
    /// Creates a missing artifact error for the given source file
    pub fn missing_artifact(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        VolaError::MissingArtifact {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a malformed identifier error
    pub fn malformed_identifier(field: &'static str, value: impl Into<String>) -> Self {
        VolaError::MalformedIdentifier {
            field,
            value: value.into(),
        }
    }

    /// Creates an I/O error bound to the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        VolaError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a spawn error for a rendered command line
    pub fn spawn(command: impl fmt::Display, source: std::io::Error) -> Self {
        VolaError::Spawn {
            command: command.to_string(),
            source,
        }
    }

    /// Number of underlying failures this error stands for
    pub fn failure_count(&self) -> usize {
        match self {
            VolaError::Aggregated(failures) => failures.len(),
            _ => 1,
        }
    }
}

/// A single extraction that did not succeed
#[derive(Debug)]
pub struct DumpFailure {
    /// Path of the file record as reported by the tool
    pub path: String,
    pub error: VolaError,
}

/// Every failure of a concurrent dump run, in submission order
#[derive(Debug, Default)]
pub struct DumpFailures {
    failures: Vec<DumpFailure>,
}

impl DumpFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, error: VolaError) {
        self.failures.push(DumpFailure {
            path: path.into(),
            error,
        });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DumpFailure> {
        self.failures.iter()
    }

    /// Turns the collected failures into a result, `Ok` when nothing failed
    pub fn into_result(self) -> VolaResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(VolaError::Aggregated(self))
        }
    }
}

impl fmt::Display for DumpFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} file dump(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.path, failure.error)?;
        }
        Ok(())
    }
}

impl IntoIterator for DumpFailures {
    type Item = DumpFailure;
    type IntoIter = std::vec::IntoIter<DumpFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}
