//! Analysis modules: one tool plugin each, cached by its artifact
//!
//! Every module goes through the [`ExecutionGate`] before running and through
//! the shared [`Invoke`] implementation when it does run.

pub mod plugin;

pub use plugin::{default_catalog, ModuleOutput, PluginModule};

use crate::core::types::VolaResult;
use crate::execution::{ExecutionGate, Invoke};
use std::path::{Path, PathBuf};

/// Whether a module actually ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOutcome {
    Executed,
    Cached,
}

/// Shared pieces a module needs to run
pub struct RunContext<'a> {
    pub gate: &'a ExecutionGate,
    pub invoker: &'a dyn Invoke,
    pub artifacts_dir: &'a Path,
}

/// One analysis unit of the tool
pub trait VolModule: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Location whose presence marks a completed run
    fn artifact_path(&self, artifacts_dir: &Path) -> PathBuf;

    /// Runs the module unless its artifact is already there
    fn run(&self, ctx: &RunContext<'_>) -> VolaResult<ModuleOutcome>;
}
