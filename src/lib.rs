//! Vola-Auto library: drives a memory forensics tool against a memory image
//!
//! Plugins run once per artifact and are skipped when their output already
//! exists. The text tables they print are parsed into process and file
//! records, the process tree is rebuilt from two artifacts, and file objects
//! are extracted in parallel.

pub mod collectors;
pub mod config;
pub mod core;
pub mod dump;
pub mod execution;
pub mod modules;
pub mod parser;
pub mod report;
pub mod session;
pub mod store;

// Re-export main types from core module
pub use crate::core::types::{
    DumpFailure, DumpFailures, FileOffset, FileRecord, OffsetKind, ProcessId, ProcessRecord,
    Profile, VolaError, VolaResult,
};

pub use session::Session;
pub use store::ArtifactStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_constants() {
        assert_eq!(crate::core::VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(crate::core::AUTHORS, env!("CARGO_PKG_AUTHORS"));
    }

    #[test]
    fn test_record_reexports() {
        let process = ProcessRecord::new(1234, "lsass.exe", "C:\\Windows\\system32\\lsass.exe");
        assert_eq!(process.pid, 1234);
        assert!(process.parent.is_none());

        let file = FileRecord::new("\\Windows\\win.ini", FileOffset::Virtual("0x1".into()));
        assert_eq!(file.dump_offset().map(|o| o.kind()), Some(OffsetKind::Virtual));
    }

    #[test]
    fn test_result_reexport() {
        let result: VolaResult<u32> = Err(VolaError::EmptyOffset("x".to_string()));
        assert!(result.is_err());
    }
}
