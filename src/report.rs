//! Derived results written next to the raw artifacts

use crate::core::types::{ProcessId, ProcessRecord, VolaError, VolaResult};
use crate::store::ArtifactStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// File name of the process tree inside the analytics directory
pub const PROCESS_TREE_FILE: &str = "process_tree.json";

/// A process and everything it spawned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessNode {
    pub pid: ProcessId,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub args: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ProcessNode>,
}

/// Nested view of the process graph, roots ordered by pid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTreeReport {
    pub process_count: usize,
    pub roots: Vec<ProcessNode>,
}

impl ProcessTreeReport {
    pub fn from_store(store: &ArtifactStore) -> Self {
        let mut children: HashMap<ProcessId, Vec<&ProcessRecord>> = HashMap::new();
        for record in store.processes() {
            if let Some(parent) = record.parent {
                children.entry(parent).or_default().push(record);
            }
        }

        let mut visited = HashSet::new();
        let roots = store
            .roots()
            .into_iter()
            .filter_map(|root| build_node(root, &children, &mut visited))
            .collect();

        ProcessTreeReport {
            process_count: store.process_count(),
            roots,
        }
    }

    pub fn to_json(&self) -> VolaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report, creating the parent directory if needed
    pub fn write_json(&self, path: &Path) -> VolaResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| VolaError::io(parent, e))?;
        }
        fs::write(path, self.to_json()?).map_err(|e| VolaError::io(path, e))
    }
}

fn build_node(
    record: &ProcessRecord,
    children: &HashMap<ProcessId, Vec<&ProcessRecord>>,
    visited: &mut HashSet<ProcessId>,
) -> Option<ProcessNode> {
    if !visited.insert(record.pid) {
        return None;
    }

    let kids: Vec<ProcessNode> = children
        .get(&record.pid)
        .map(|kids| {
            kids.iter()
                .filter_map(|kid| build_node(kid, children, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(ProcessNode {
        pid: record.pid,
        name: record.name.clone(),
        args: record.args.clone(),
        children: kids,
    })
}
