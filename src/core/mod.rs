//! Core module containing fundamental types for Vola-Auto
//!
//! This module provides the foundational building blocks used throughout
//! the crate: process and file records, offsets, profiles and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    FileOffset,
    FileRecord,
    OffsetKind,
    ProcessId,
    ProcessRecord,
    Profile,
    VolaError,
    VolaResult,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
