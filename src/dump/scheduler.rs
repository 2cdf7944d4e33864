//! Parallel extraction of file objects from the memory image

use crate::core::types::{DumpFailures, FileRecord, VolaError, VolaResult};
use crate::execution::{Invoke, OUTPUT_DIR_FLAG};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::borrow::Borrow;
use std::path::Path;
use tracing::{info, warn};

/// Plugin that writes a file object out of the image
pub const DUMP_PLUGIN: &str = "windows.dumpfiles.DumpFiles";

/// Runs one dump invocation per file record on a fixed-size pool
///
/// Failures never cancel the remaining dumps. Each task hands back its own
/// result and the caller sees them all once every task has finished.
pub struct DumpScheduler<'a> {
    invoker: &'a dyn Invoke,
    pool: ThreadPool,
}

impl<'a> DumpScheduler<'a> {
    pub fn new(invoker: &'a dyn Invoke, workers: usize) -> VolaResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dump-worker-{}", i))
            .build()?;
        Ok(DumpScheduler { invoker, pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Tool arguments extracting `record` into `output_folder`
    pub fn dump_args(&self, record: &FileRecord, output_folder: &Path) -> VolaResult<Vec<String>> {
        let offset = record
            .dump_offset()
            .ok_or_else(|| VolaError::EmptyOffset(record.path.clone()))?;

        Ok(vec![
            self.invoker.binary().to_string(),
            "-f".to_string(),
            self.invoker.image_path().display().to_string(),
            OUTPUT_DIR_FLAG.to_string(),
            output_folder.display().to_string(),
            DUMP_PLUGIN.to_string(),
            offset.kind().dump_flag().to_string(),
            offset.value().to_string(),
        ])
    }

    /// Extracts a single file object
    pub fn dump_file(&self, record: &FileRecord, output_folder: &Path) -> VolaResult<()> {
        let args = self.dump_args(record, output_folder)?;
        self.invoker.invoke(args, Some(output_folder), true)
    }

    /// Extracts every record, collecting all failures
    pub fn dump_all<R>(&self, records: &[R], output_folder: &Path) -> VolaResult<()>
    where
        R: Borrow<FileRecord> + Sync,
    {
        let results: Vec<VolaResult<()>> = self.pool.install(|| {
            records
                .par_iter()
                .map(|record| self.dump_file(record.borrow(), output_folder))
                .collect()
        });

        let mut failures = DumpFailures::new();
        for (record, result) in records.iter().zip(results) {
            if let Err(err) = result {
                let record = record.borrow();
                warn!(file = %record.path, error = %err, "File dump failed");
                failures.push(record.path.as_str(), err);
            }
        }

        info!(
            requested = records.len(),
            failed = failures.len(),
            output = %output_folder.display(),
            "File dump finished"
        );
        failures.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FileOffset;
    use std::path::PathBuf;

    struct NoopInvoker {
        image: PathBuf,
    }

    impl Invoke for NoopInvoker {
        fn invoke(&self, _args: Vec<String>, _result_path: Option<&Path>, _overwrite: bool) -> VolaResult<()> {
            Ok(())
        }

        fn binary(&self) -> &str {
            "vol.py"
        }

        fn image_path(&self) -> &Path {
            &self.image
        }
    }

    #[test]
    fn test_dump_args() {
        let invoker = NoopInvoker { image: PathBuf::from("/cases/mem.raw") };
        let scheduler = DumpScheduler::new(&invoker, 2).unwrap();
        assert_eq!(scheduler.workers(), 2);

        let record = FileRecord::new("\\a.exe", FileOffset::Physical("0x3e1c0".to_string()));
        let args = scheduler.dump_args(&record, Path::new("/out/files")).unwrap();
        assert_eq!(
            args,
            vec![
                "vol.py",
                "-f",
                "/cases/mem.raw",
                "-o",
                "/out/files",
                DUMP_PLUGIN,
                "--physaddr",
                "0x3e1c0"
            ]
        );
    }

    #[test]
    fn test_empty_offset_is_an_error() {
        let invoker = NoopInvoker { image: PathBuf::from("/cases/mem.raw") };
        let scheduler = DumpScheduler::new(&invoker, 1).unwrap();
        let err = scheduler
            .dump_file(&FileRecord::without_offset("\\gone.sys"), Path::new("/out"))
            .unwrap_err();
        assert!(matches!(err, VolaError::EmptyOffset(path) if path == "\\gone.sys"));
    }
}
