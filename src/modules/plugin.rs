//! Catalog entries backed by a single tool plugin

use super::{ModuleOutcome, RunContext, VolModule};
use crate::core::types::{VolaError, VolaResult};
use crate::execution::OUTPUT_DIR_FLAG;
use crate::parser::ArtifactKind;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a plugin leaves its results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutput {
    /// Captured console output, one text file
    File(String),
    /// Files the plugin writes itself into a directory
    Directory(String),
}

/// A catalog module that runs one plugin with fixed arguments
#[derive(Debug, Clone)]
pub struct PluginModule {
    name: String,
    plugin: String,
    output: ModuleOutput,
    extra_args: Vec<String>,
}

impl PluginModule {
    /// Module whose console output is captured to `file_name`
    pub fn new(name: impl Into<String>, plugin: impl Into<String>, file_name: impl Into<String>) -> Self {
        PluginModule {
            name: name.into(),
            plugin: plugin.into(),
            output: ModuleOutput::File(file_name.into()),
            extra_args: Vec::new(),
        }
    }

    /// Module that writes its own files into `dir_name`
    pub fn writing_directory(
        name: impl Into<String>,
        plugin: impl Into<String>,
        dir_name: impl Into<String>,
    ) -> Self {
        PluginModule {
            name: name.into(),
            plugin: plugin.into(),
            output: ModuleOutput::Directory(dir_name.into()),
            extra_args: Vec::new(),
        }
    }

    /// Appends plugin arguments placed after the plugin name
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Module producing the artifact a collector reads
    pub fn for_artifact(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::PsList => PluginModule::new("pslist", "windows.pslist.PsList", "pslist.txt"),
            ArtifactKind::CmdLine => {
                PluginModule::new("cmdline", "windows.cmdline.CmdLine", "cmdline.txt")
            }
            ArtifactKind::FileScan => {
                PluginModule::new("filescan", "windows.filescan.FileScan", "filescan.txt")
            }
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn output(&self) -> &ModuleOutput {
        &self.output
    }

    /// Arguments handed to the invoker
    pub fn invocation_args(&self, artifact_path: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 3);
        if let ModuleOutput::Directory(_) = self.output {
            args.push(OUTPUT_DIR_FLAG.to_string());
            args.push(artifact_path.display().to_string());
        }
        args.push(self.plugin.clone());
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl VolModule for PluginModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn artifact_path(&self, artifacts_dir: &Path) -> PathBuf {
        match &self.output {
            ModuleOutput::File(name) | ModuleOutput::Directory(name) => artifacts_dir.join(name),
        }
    }

    fn run(&self, ctx: &RunContext<'_>) -> VolaResult<ModuleOutcome> {
        let path = self.artifact_path(ctx.artifacts_dir);
        if !ctx.gate.is_run_required(&path) {
            debug!(module = %self.name, artifact = %path.display(), "Artifact cached, skipping");
            return Ok(ModuleOutcome::Cached);
        }

        if let ModuleOutput::Directory(_) = self.output {
            fs::create_dir_all(&path).map_err(|e| VolaError::io(&path, e))?;
        }

        info!(module = %self.name, plugin = %self.plugin, "Running module");
        ctx.invoker
            .invoke(self.invocation_args(&path), Some(&path), true)?;
        Ok(ModuleOutcome::Executed)
    }
}

/// Modules run for every image
///
/// The first three feed the collectors; the rest keep their raw output.
pub fn default_catalog() -> Vec<Box<dyn VolModule>> {
    vec![
        Box::new(PluginModule::for_artifact(ArtifactKind::PsList)),
        Box::new(PluginModule::for_artifact(ArtifactKind::CmdLine)),
        Box::new(PluginModule::for_artifact(ArtifactKind::FileScan)),
        Box::new(PluginModule::new("pstree", "windows.pstree.PsTree", "pstree.txt")),
        Box::new(PluginModule::new("netscan", "windows.netscan.NetScan", "netscan.txt")),
        Box::new(PluginModule::new("dlllist", "windows.dlllist.DllList", "dlllist.txt")),
        Box::new(PluginModule::new("malfind", "windows.malfind.Malfind", "malfind.txt")),
        Box::new(
            PluginModule::writing_directory("malfind-dump", "windows.malfind.Malfind", "malfind")
                .with_args(["--dump"]),
        ),
    ]
}
