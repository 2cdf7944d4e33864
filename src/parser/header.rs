//! Header detection for plugin tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names that must all appear on a line for it to count as the header
///
/// Matching is by substring and ignores column order, so small layout changes
/// between tool versions still find the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMarkers {
    markers: Vec<String>,
}

impl HeaderMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HeaderMarkers {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks whether `line` contains every marker
    pub fn matches(&self, line: &str) -> bool {
        self.markers.iter().all(|marker| line.contains(marker.as_str()))
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

/// Plugin outputs the collectors know how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    FileScan,
    CmdLine,
    PsList,
}

impl ArtifactKind {
    /// Required header markers for this artifact
    pub fn markers(&self) -> HeaderMarkers {
        match self {
            ArtifactKind::FileScan => HeaderMarkers::new(["Offset", "Name", "Size"]),
            ArtifactKind::CmdLine => HeaderMarkers::new(["PID", "Process", "Args"]),
            ArtifactKind::PsList => HeaderMarkers::new(["PID", "PPID", "ImageFileName"]),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::FileScan => "filescan",
            ArtifactKind::CmdLine => "cmdline",
            ArtifactKind::PsList => "pslist",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superset_header_matches() {
        let markers = ArtifactKind::FileScan.markers();
        assert!(markers.matches("Offset    Name    Size    Cached"));
        assert!(markers.matches("Size Name Offset"));
    }

    #[test]
    fn test_partial_header_does_not_match() {
        let markers = ArtifactKind::FileScan.markers();
        assert!(!markers.matches("Offset    Name"));
        assert!(!markers.matches("Name    Size"));
        assert!(!markers.matches("offset    name    size"));
    }

    #[test]
    fn test_substring_tolerance() {
        // "PPID" contains "PID" on its own
        let markers = ArtifactKind::PsList.markers();
        assert!(markers.matches("PPID    ImageFileName"));
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(ArtifactKind::CmdLine.to_string(), "cmdline");
        assert_eq!(ArtifactKind::PsList.markers().markers().len(), 3);
    }
}
