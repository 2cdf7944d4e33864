//! Core type definitions for Vola-Auto
//!
//! This module contains the records recovered from plugin output and the
//! error types shared by every stage of a run.

mod error;
mod file_record;
mod process_record;

// Re-export all public types
pub use error::{DumpFailure, DumpFailures, VolaError, VolaResult};
pub use file_record::{FileOffset, FileRecord, OffsetKind, Profile};
pub use process_record::{ProcessRecord, SYSTEM_PID};

// Common type aliases
pub type ProcessId = u32;
