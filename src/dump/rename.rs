//! Renaming of files produced by the dump plugin

use crate::core::types::{VolaError, VolaResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Replaces the extension of every dumped file whose name ends with `match_suffix`
///
/// The last extension is dropped and `new_suffix` appended, so
/// `file.0x1.invoice.docm.dat` with `.dat` -> `.docm` becomes
/// `file.0x1.invoice.docm.docm`. Returns the number of renamed files.
pub fn rename_dumped_files(folder: &Path, match_suffix: &str, new_suffix: &str) -> VolaResult<usize> {
    let mut matches = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(|source| VolaError::Walk {
            path: folder.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(match_suffix) {
            matches.push(entry.into_path());
        }
    }

    for path in &matches {
        let target = renamed_path(path, new_suffix);
        debug!(from = %path.display(), to = %target.display(), "Renaming dumped file");
        fs::rename(path, &target).map_err(|e| VolaError::io(path, e))?;
    }
    Ok(matches.len())
}

fn renamed_path(path: &Path, new_suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", stem, new_suffix))
}
