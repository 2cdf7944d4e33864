//! Collects file objects from the file scan artifact

use crate::core::types::{FileOffset, FileRecord, Profile, VolaError, VolaResult};
use crate::parser::{ArtifactKind, TableParser};
use crate::store::ArtifactStore;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Turns file scan rows into [`FileRecord`]s
///
/// The first column is the object's offset; whether it is physical or
/// virtual depends on the image profile.
#[derive(Debug, Clone)]
pub struct FilesCollector {
    profile: Profile,
    parser: TableParser,
}

impl FilesCollector {
    pub fn new(profile: Profile) -> Self {
        FilesCollector {
            profile,
            parser: TableParser::for_artifact(ArtifactKind::FileScan),
        }
    }

    /// Reads the artifact at `path` into the store
    pub fn collect(&self, path: &Path, store: &mut ArtifactStore) -> VolaResult<usize> {
        let file = File::open(path).map_err(|e| VolaError::missing_artifact(path, e))?;
        let collected = self.collect_from(BufReader::new(file), store)?;
        info!(artifact = %path.display(), files = collected, "Collected files");
        Ok(collected)
    }

    /// Reads file scan rows from any line source
    pub fn collect_from<R: BufRead>(&self, reader: R, store: &mut ArtifactStore) -> VolaResult<usize> {
        let kind = self.profile.offset_kind();
        let summary = self.parser.parse(reader, |fields| {
            store.push_file(FileRecord::new(fields[1], FileOffset::new(kind, fields[0])));
            Ok(())
        })?;
        Ok(summary.rows)
    }
}

/// Records whose path matches `pattern`, in store order
pub fn find_by_regex<'a>(files: &'a [FileRecord], pattern: &str) -> VolaResult<Vec<&'a FileRecord>> {
    let re = Regex::new(pattern)?;
    Ok(files.iter().filter(|file| re.is_match(&file.path)).collect())
}
