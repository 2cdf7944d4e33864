//! In-memory store of records collected during a run
//!
//! The store owns every [`ProcessRecord`] keyed by pid and every
//! [`FileRecord`] in scan order. Parent relationships are stored as pid keys,
//! so walking the graph is always a lookup into the same map.

use crate::core::types::{FileRecord, ProcessId, ProcessRecord};
use std::collections::{BTreeMap, HashSet};

/// Outcome of an attempt to attach a parent to a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// The child now points at the parent
    Linked,
    /// Either endpoint is not in the store
    MissingEndpoint,
    /// The link would make the process its own ancestor
    Cycle,
}

/// Records collected from the artifacts of one memory image
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    processes: BTreeMap<ProcessId, ProcessRecord>,
    files: Vec<FileRecord>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a process, replacing any earlier record with the same pid
    pub fn insert_process(&mut self, record: ProcessRecord) -> Option<ProcessRecord> {
        self.processes.insert(record.pid, record)
    }

    pub fn process(&self, pid: ProcessId) -> Option<&ProcessRecord> {
        self.processes.get(&pid)
    }

    pub fn contains_process(&self, pid: ProcessId) -> bool {
        self.processes.contains_key(&pid)
    }

    /// All processes ordered by pid
    pub fn processes(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.processes.values()
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Parent record of `pid`, if linked
    pub fn parent(&self, pid: ProcessId) -> Option<&ProcessRecord> {
        self.process(pid)
            .and_then(|record| record.parent)
            .and_then(|parent| self.process(parent))
    }

    /// Direct children of `pid`, ordered by pid
    pub fn children(&self, pid: ProcessId) -> Vec<&ProcessRecord> {
        self.processes
            .values()
            .filter(|record| record.parent == Some(pid))
            .collect()
    }

    /// Processes without a parent link, ordered by pid
    pub fn roots(&self) -> Vec<&ProcessRecord> {
        self.processes
            .values()
            .filter(|record| record.parent.is_none())
            .collect()
    }

    /// Walks the parent chain of `pid`, nearest ancestor first
    pub fn ancestors(&self, pid: ProcessId) -> Ancestors<'_> {
        let mut seen = HashSet::new();
        seen.insert(pid);
        Ancestors {
            store: self,
            next: self.process(pid).and_then(|record| record.parent),
            seen,
        }
    }

    /// Attaches `parent` to `child` when both exist and no cycle results
    ///
    /// Rejected links leave both records untouched.
    pub fn link_parent(&mut self, child: ProcessId, parent: ProcessId) -> ParentLink {
        if !self.contains_process(child) || !self.contains_process(parent) {
            return ParentLink::MissingEndpoint;
        }
        if child == parent || self.ancestors(parent).any(|ancestor| ancestor.pid == child) {
            return ParentLink::Cycle;
        }
        if let Some(record) = self.processes.get_mut(&child) {
            record.parent = Some(parent);
        }
        ParentLink::Linked
    }

    /// Takes over the process graph of `other`, leaving the files untouched
    pub fn replace_processes(&mut self, other: ArtifactStore) {
        self.processes = other.processes;
    }

    /// Takes over the file list of `other`, leaving the processes untouched
    pub fn replace_files(&mut self, other: ArtifactStore) {
        self.files = other.files;
    }

    pub fn push_file(&mut self, record: FileRecord) {
        self.files.push(record);
    }

    /// Files in the order the scan reported them
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Iterator over the ancestors of a process
///
/// Stops at the first missing or already visited pid.
pub struct Ancestors<'a> {
    store: &'a ArtifactStore,
    next: Option<ProcessId>,
    seen: HashSet<ProcessId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ProcessRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let pid = self.next.take()?;
        if !self.seen.insert(pid) {
            return None;
        }
        let record = self.store.process(pid)?;
        self.next = record.parent;
        Some(record)
    }
}
