//! One analysis run against one memory image
//!
//! A [`Session`] owns everything a run needs: configuration, the re-run gate,
//! the tool invoker and the record store. Files and processes are collected
//! independently through `&mut self` and dumped through `&self`, so the
//! store cannot change while dump workers read it.

use crate::collectors::{find_by_regex, FilesCollector, GraphSummary, ProcessGraphBuilder};
use crate::config::{validate_config, Config};
use crate::core::types::{FileRecord, VolaError, VolaResult};
use crate::dump::DumpScheduler;
use crate::execution::{ExecutionGate, Invoke, ModuleInvoker};
use crate::modules::{ModuleOutcome, PluginModule, RunContext, VolModule};
use crate::parser::ArtifactKind;
use crate::report::{ProcessTreeReport, PROCESS_TREE_FILE};
use crate::store::ArtifactStore;
use std::borrow::Borrow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// How many catalog modules ran and how many were served from cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleRunSummary {
    pub executed: usize,
    pub cached: usize,
}

/// Context object for a run
pub struct Session<I: Invoke = ModuleInvoker> {
    config: Config,
    gate: ExecutionGate,
    invoker: I,
    store: ArtifactStore,
}

impl Session<ModuleInvoker> {
    /// Creates a session that spawns the configured tool
    pub fn new(config: Config) -> VolaResult<Self> {
        let invoker = ModuleInvoker::new(
            config.tool.runner.clone(),
            config.tool.binary.clone(),
            config.image.path.clone(),
            config.scratch_path(),
        );
        Session::with_invoker(config, invoker)
    }
}

impl<I: Invoke> Session<I> {
    /// Creates a session around a custom invoker
    pub fn with_invoker(config: Config, invoker: I) -> VolaResult<Self> {
        validate_config(&config)?;
        Ok(Session {
            gate: ExecutionGate::new(config.execution.force_rerun),
            config,
            invoker,
            store: ArtifactStore::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gate(&self) -> &ExecutionGate {
        &self.gate
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Location of the artifact a collector reads
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        PluginModule::for_artifact(kind).artifact_path(&self.config.artifacts_path())
    }

    /// Runs every module in order, stopping at the first failure
    pub fn run_modules(&self, modules: &[Box<dyn VolModule>]) -> VolaResult<ModuleRunSummary> {
        let artifacts_dir = self.config.artifacts_path();
        fs::create_dir_all(&artifacts_dir).map_err(|e| VolaError::io(&artifacts_dir, e))?;

        let ctx = RunContext {
            gate: &self.gate,
            invoker: &self.invoker,
            artifacts_dir: &artifacts_dir,
        };

        let mut summary = ModuleRunSummary::default();
        for module in modules {
            match module.run(&ctx)? {
                ModuleOutcome::Executed => summary.executed += 1,
                ModuleOutcome::Cached => summary.cached += 1,
            }
        }

        info!(executed = summary.executed, cached = summary.cached, "Modules finished");
        Ok(summary)
    }

    /// Parses the filescan artifact, replacing the collected files
    ///
    /// The process graph is left as it was, so a missing filescan never
    /// costs the processes.
    pub fn collect_files(&mut self) -> VolaResult<usize> {
        let mut scanned = ArtifactStore::new();
        let count = FilesCollector::new(self.config.profile())
            .collect(&self.artifact_path(ArtifactKind::FileScan), &mut scanned)?;
        self.store.replace_files(scanned);
        Ok(count)
    }

    /// Rebuilds the process graph from cmdline and pslist, keeping the files
    pub fn collect_processes(&mut self) -> VolaResult<GraphSummary> {
        let mut graph = ArtifactStore::new();
        let summary = ProcessGraphBuilder::new().build(
            &self.artifact_path(ArtifactKind::CmdLine),
            &self.artifact_path(ArtifactKind::PsList),
            &mut graph,
        )?;
        self.store.replace_processes(graph);
        Ok(summary)
    }

    /// Collected files whose path matches `pattern`
    pub fn find_files(&self, pattern: &str) -> VolaResult<Vec<&FileRecord>> {
        find_by_regex(self.store.files(), pattern)
    }

    /// Extracts the given records into `output_folder`
    pub fn dump_records<R>(&self, records: &[R], output_folder: &Path) -> VolaResult<()>
    where
        R: Borrow<FileRecord> + Sync,
    {
        fs::create_dir_all(output_folder).map_err(|e| VolaError::io(output_folder, e))?;
        let scheduler = DumpScheduler::new(&self.invoker, self.config.execution.workers)?;
        scheduler.dump_all(records, output_folder)
    }

    /// Extracts every collected file matching `pattern`, returning how many were requested
    pub fn dump_files(&self, pattern: &str, output_folder: &Path) -> VolaResult<usize> {
        let selected = self.find_files(pattern)?;
        if selected.is_empty() {
            info!(pattern, "No collected file matches");
            return Ok(0);
        }
        self.dump_records(&selected, output_folder)?;
        Ok(selected.len())
    }

    /// Writes the process tree into the analytics directory
    pub fn write_process_report(&self) -> VolaResult<PathBuf> {
        let path = self.config.analytics_path().join(PROCESS_TREE_FILE);
        ProcessTreeReport::from_store(&self.store).write_json(&path)?;
        info!(report = %path.display(), "Wrote process tree");
        Ok(path)
    }
}
