//! Rebuilds the process tree from the cmdline and pslist artifacts
//!
//! The cmdline artifact provides every process with its arguments; pslist
//! provides the parent of each pid. Pids are the join key between the two,
//! so a pid that does not parse fails the whole pass.

use crate::core::types::{ProcessId, ProcessRecord, VolaError, VolaResult};
use crate::parser::{ArtifactKind, TableParser};
use crate::store::{ArtifactStore, ParentLink};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts from a graph build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphSummary {
    /// Processes loaded from the cmdline artifact
    pub processes: usize,
    /// Parent links attached
    pub linked: usize,
    /// pslist rows naming a pid the cmdline artifact lacks
    pub unresolved: usize,
    /// Links refused because they would close a loop
    pub cycles: usize,
}

/// Two-pass builder for the process graph
#[derive(Debug, Clone)]
pub struct ProcessGraphBuilder {
    cmdline: TableParser,
    pslist: TableParser,
}

impl Default for ProcessGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessGraphBuilder {
    pub fn new() -> Self {
        ProcessGraphBuilder {
            cmdline: TableParser::for_artifact(ArtifactKind::CmdLine),
            pslist: TableParser::for_artifact(ArtifactKind::PsList),
        }
    }

    /// Runs both passes over the artifacts on disk
    pub fn build(
        &self,
        cmdline_path: &Path,
        pslist_path: &Path,
        store: &mut ArtifactStore,
    ) -> VolaResult<GraphSummary> {
        let cmdline = open_artifact(cmdline_path)?;
        let processes = self.load_processes(cmdline, store)?;

        let pslist = open_artifact(pslist_path)?;
        let mut summary = self.link_parents(pslist, store)?;
        summary.processes = processes;

        info!(
            processes = summary.processes,
            linked = summary.linked,
            unresolved = summary.unresolved,
            cycles = summary.cycles,
            "Built process graph"
        );
        Ok(summary)
    }

    /// Pass one: one record per cmdline row
    pub fn load_processes<R: BufRead>(&self, reader: R, store: &mut ArtifactStore) -> VolaResult<usize> {
        let summary = self.cmdline.parse(reader, |fields| {
            let pid = parse_pid(fields[0], "pid")?;
            // Names with spaces are split across fields; only the first is kept
            let record = ProcessRecord::new(pid, fields[1], fields[2..].join(" "));
            store.insert_process(record);
            Ok(())
        })?;
        Ok(summary.rows)
    }

    /// Pass two: attach parents named by pslist rows
    pub fn link_parents<R: BufRead>(&self, reader: R, store: &mut ArtifactStore) -> VolaResult<GraphSummary> {
        let mut summary = GraphSummary::default();
        self.pslist.parse(reader, |fields| {
            let pid = parse_pid(fields[0], "pid")?;
            let ppid = parse_pid(fields[1], "ppid")?;

            match store.link_parent(pid, ppid) {
                ParentLink::Linked => summary.linked += 1,
                ParentLink::MissingEndpoint => {
                    debug!(pid, ppid, "Skipping parent link with unknown endpoint");
                    summary.unresolved += 1;
                }
                ParentLink::Cycle => {
                    warn!(pid, ppid, "Rejected parent link that would form a cycle");
                    summary.cycles += 1;
                }
            }
            Ok(())
        })?;
        Ok(summary)
    }
}

fn open_artifact(path: &Path) -> VolaResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| VolaError::missing_artifact(path, e))
}

fn parse_pid(value: &str, field: &'static str) -> VolaResult<ProcessId> {
    value
        .parse()
        .map_err(|_| VolaError::malformed_identifier(field, value))
}
