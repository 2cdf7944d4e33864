//! Runs the analysis tool and captures what it prints

use crate::core::types::{VolaError, VolaResult};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};
use uuid::Uuid;

/// Flag that makes a plugin write its own files into a directory
pub const OUTPUT_DIR_FLAG: &str = "-o";

/// Entry point every plugin invocation goes through
pub trait Invoke: Send + Sync {
    /// Runs the tool with `args`
    ///
    /// Output goes to `result_path` (or a scratch file when `None`), appended
    /// or truncated depending on `overwrite`. When `args` carries
    /// [`OUTPUT_DIR_FLAG`] the tool writes its own files and `result_path` is
    /// only logged.
    fn invoke(&self, args: Vec<String>, result_path: Option<&Path>, overwrite: bool)
        -> VolaResult<()>;

    /// Name of the tool's entry script or binary
    fn binary(&self) -> &str;

    /// Memory image every invocation analyses
    fn image_path(&self) -> &Path;
}

/// Invokes the tool as a child process
#[derive(Debug, Clone)]
pub struct ModuleInvoker {
    runner: String,
    binary: String,
    image_path: PathBuf,
    scratch_dir: PathBuf,
}

impl ModuleInvoker {
    /// Creates an invoker that starts `runner` with `binary` as its first argument
    pub fn new(
        runner: impl Into<String>,
        binary: impl Into<String>,
        image_path: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        ModuleInvoker {
            runner: runner.into(),
            binary: binary.into(),
            image_path: image_path.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Full argument vector passed to the runner
    ///
    /// Callers that already start with the binary keep full control of the
    /// flags; everyone else gets quiet mode and the image path prepended.
    /// An empty argv is passed through as is.
    pub fn command_line(&self, args: Vec<String>) -> Vec<String> {
        let first = match args.first() {
            Some(first) => first,
            None => return args,
        };
        if first.eq_ignore_ascii_case(&self.binary) {
            return args;
        }

        let mut full = Vec::with_capacity(args.len() + 4);
        full.push(self.binary.clone());
        full.push("-q".to_string());
        full.push("-f".to_string());
        full.push(self.image_path.display().to_string());
        full.extend(args);
        full
    }

    /// Fresh output file in the scratch directory for unnamed invocations
    pub fn batch_output_path(&self) -> PathBuf {
        let id = Uuid::new_v4().to_string();
        self.scratch_dir.join(format!("{}.txt", &id[..8]))
    }

    fn render(&self, argv: &[String]) -> String {
        std::iter::once(self.runner.as_str())
            .chain(argv.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Invoke for ModuleInvoker {
    fn invoke(
        &self,
        args: Vec<String>,
        result_path: Option<&Path>,
        overwrite: bool,
    ) -> VolaResult<()> {
        let writes_directory = args.iter().any(|arg| arg == OUTPUT_DIR_FLAG);
        let argv = self.command_line(args);
        let rendered = self.render(&argv);

        let mut command = Command::new(&self.runner);
        command.args(&argv).stdin(Stdio::null());

        if writes_directory {
            command.stdout(Stdio::null()).stderr(Stdio::null());
            debug!(cmd = %rendered, output = ?result_path, "Executing");
        } else {
            let named = result_path.filter(|path| !path.as_os_str().is_empty());
            let output = match named {
                Some(path) => path.to_path_buf(),
                None => {
                    fs::create_dir_all(&self.scratch_dir)
                        .map_err(|e| VolaError::io(&self.scratch_dir, e))?;
                    self.batch_output_path()
                }
            };

            let stdout = open_output(&output, overwrite)?;
            let stderr = stdout.try_clone().map_err(|e| VolaError::io(&output, e))?;
            command.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr));

            if named.is_some() {
                debug!(cmd = %rendered, output = %output.display(), "Executing");
            } else {
                info!(cmd = %rendered, output = %output.display(), "Executing");
            }
        }

        let status = command
            .status()
            .map_err(|e| VolaError::spawn(&rendered, e))?;
        if !status.success() {
            return Err(VolaError::SubprocessFailed {
                command: rendered,
                status,
            });
        }
        Ok(())
    }

    fn binary(&self) -> &str {
        &self.binary
    }

    fn image_path(&self) -> &Path {
        &self.image_path
    }
}

/// Opens a capture file, truncating or appending
fn open_output(path: &Path, overwrite: bool) -> VolaResult<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .append(!overwrite)
        .truncate(overwrite)
        .open(path)
        .map_err(|e| VolaError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn invoker(runner: &str, scratch: &Path) -> ModuleInvoker {
        ModuleInvoker::new(runner, "vol.py", "/cases/mem.raw", scratch)
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_line_prepends_common_flags() {
        let inv = invoker("python3", Path::new("/tmp"));
        assert_eq!(
            inv.command_line(args(&["windows.pslist.PsList"])),
            args(&["vol.py", "-q", "-f", "/cases/mem.raw", "windows.pslist.PsList"])
        );
    }

    #[test]
    fn test_command_line_keeps_explicit_binary() {
        let inv = invoker("python3", Path::new("/tmp"));
        let explicit = args(&["VOL.PY", "-f", "/x.raw", "-o", "/out", "windows.dumpfiles.DumpFiles"]);
        assert_eq!(inv.command_line(explicit.clone()), explicit);
    }

    #[test]
    fn test_command_line_leaves_empty_args_alone() {
        let inv = invoker("python3", Path::new("/tmp"));
        assert!(inv.command_line(Vec::new()).is_empty());
    }

    #[test]
    fn test_batch_output_path() {
        let inv = invoker("python3", Path::new("/scratch"));
        let path = inv.batch_output_path();
        assert_eq!(path.parent(), Some(Path::new("/scratch")));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.len(), 12);
        assert!(name.ends_with(".txt"));
        assert_ne!(path, inv.batch_output_path());
    }

    #[test]
    fn test_open_failure_is_reported_before_spawn() {
        let dir = TempDir::new().unwrap();
        let inv = invoker("/nonexistent/runner", dir.path());
        let target = dir.path().join("missing").join("out.txt");

        let err = inv
            .invoke(args(&["windows.info.Info"]), Some(&target), true)
            .unwrap_err();
        assert!(matches!(err, VolaError::Io { .. }));
    }

    #[test]
    fn test_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let inv = invoker("/nonexistent/runner", dir.path());
        let target = dir.path().join("out.txt");

        let err = inv
            .invoke(args(&["windows.info.Info"]), Some(&target), true)
            .unwrap_err();
        assert!(matches!(err, VolaError::Spawn { .. }));
    }
}
