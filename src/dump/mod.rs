//! Extraction of embedded files from the memory image

pub mod rename;
pub mod scheduler;

pub use rename::rename_dumped_files;
pub use scheduler::{DumpScheduler, DUMP_PLUGIN};
