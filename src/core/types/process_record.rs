//! Process records recovered from plugin output

use super::ProcessId;
use serde::{Deserialize, Serialize};

/// Identifier the tool reports for the kernel's System process
pub const SYSTEM_PID: ProcessId = 4;

/// A process seen in the memory image
///
/// `parent` is a key into the owning store rather than a reference, so the
/// store stays the single owner of every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: ProcessId,
    pub name: String,
    pub args: String,
    pub parent: Option<ProcessId>,
}

impl ProcessRecord {
    /// Creates a record without a parent link
    ///
    /// The System process never carries arguments; whatever the tool printed
    /// in that column is discarded.
    pub fn new(pid: ProcessId, name: impl Into<String>, args: impl Into<String>) -> Self {
        let args = if pid == SYSTEM_PID {
            String::new()
        } else {
            args.into()
        };
        ProcessRecord {
            pid,
            name: name.into(),
            args,
            parent: None,
        }
    }

    /// Checks if this is the kernel's System process
    pub fn is_system_process(&self) -> bool {
        self.pid == SYSTEM_PID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_record() {
        let record = ProcessRecord::new(1234, "explorer.exe", "C:\\Windows\\explorer.exe");
        assert_eq!(record.pid, 1234);
        assert_eq!(record.name, "explorer.exe");
        assert_eq!(record.args, "C:\\Windows\\explorer.exe");
        assert_eq!(record.parent, None);
        assert!(!record.is_system_process());
    }

    #[test]
    fn test_system_process_has_no_args() {
        let record = ProcessRecord::new(SYSTEM_PID, "System", "Required memory at 0x20 is not valid");
        assert!(record.is_system_process());
        assert!(record.args.is_empty());
    }
}
