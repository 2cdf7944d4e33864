//! Collectors turn plugin artifacts into records in the [`ArtifactStore`]
//!
//! [`ArtifactStore`]: crate::store::ArtifactStore

pub mod files;
pub mod processes;

pub use files::{find_by_regex, FilesCollector};
pub use processes::{GraphSummary, ProcessGraphBuilder};
