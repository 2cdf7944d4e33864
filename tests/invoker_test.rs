//! Spawning real programs through the module invoker
#![cfg(unix)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vola_auto::execution::{Invoke, ModuleInvoker};
use vola_auto::VolaError;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn echo_invoker(scratch: &Path) -> ModuleInvoker {
    ModuleInvoker::new("echo", "vol.py", "/cases/mem.raw", scratch)
}

#[test]
fn test_output_is_captured_to_named_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("pslist.txt");
    echo_invoker(dir.path())
        .invoke(args(&["windows.pslist.PsList"]), Some(&out), true)
        .unwrap();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "vol.py -q -f /cases/mem.raw windows.pslist.PsList\n"
    );
}

#[test]
fn test_append_and_truncate() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("netscan.txt");
    let invoker = echo_invoker(dir.path());

    invoker.invoke(args(&["first"]), Some(&out), true).unwrap();
    invoker.invoke(args(&["second"]), Some(&out), false).unwrap();
    let appended = fs::read_to_string(&out).unwrap();
    assert_eq!(appended.lines().count(), 2);
    assert!(appended.ends_with("second\n"));

    invoker.invoke(args(&["third"]), Some(&out), true).unwrap();
    let truncated = fs::read_to_string(&out).unwrap();
    assert_eq!(truncated, "vol.py -q -f /cases/mem.raw third\n");
}

#[test]
fn test_unnamed_output_lands_in_scratch_dir() {
    let dir = TempDir::new().unwrap();
    let scratch = dir.path().join("batch");
    echo_invoker(&scratch)
        .invoke(args(&["windows.info.Info"]), None, true)
        .unwrap();

    let entries: Vec<_> = fs::read_dir(&scratch)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name.len(), "12345678.txt".len());
    assert!(fs::read_to_string(&entries[0]).unwrap().contains("windows.info.Info"));
}

#[test]
fn test_directory_mode_captures_nothing() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("malfind");
    fs::create_dir(&target).unwrap();

    echo_invoker(dir.path())
        .invoke(
            args(&["-o", &target.display().to_string(), "windows.malfind.Malfind"]),
            Some(&target),
            true,
        )
        .unwrap();

    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
}

#[test]
fn test_nonzero_exit_is_an_error() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let err = ModuleInvoker::new("false", "vol.py", "/cases/mem.raw", dir.path())
        .invoke(args(&["windows.pslist.PsList"]), Some(&out), true)
        .unwrap_err();

    match err {
        VolaError::SubprocessFailed { command, status } => {
            assert!(command.starts_with("false vol.py"));
            assert!(!status.success());
        }
        other => panic!("unexpected error: {}", other),
    }
}
