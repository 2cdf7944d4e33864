//! Re-run decisions of the execution gate against real filesystem states

use proptest::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vola_auto::execution::ExecutionGate;

#[derive(Debug, Clone, Copy)]
enum PathState {
    Missing,
    EmptyFile,
    FileWithContent,
    EmptyDir,
    NonEmptyDir,
}

fn prepare(root: &Path, state: PathState) -> std::path::PathBuf {
    let path = root.join("artifact");
    match state {
        PathState::Missing => {}
        PathState::EmptyFile => fs::write(&path, b"").unwrap(),
        PathState::FileWithContent => fs::write(&path, b"PID\tPPID\tImageFileName\n").unwrap(),
        PathState::EmptyDir => fs::create_dir(&path).unwrap(),
        PathState::NonEmptyDir => {
            fs::create_dir(&path).unwrap();
            fs::write(path.join("file.0x1.dat"), b"MZ").unwrap();
        }
    }
    path
}

fn any_state() -> impl Strategy<Value = PathState> {
    prop_oneof![
        Just(PathState::Missing),
        Just(PathState::EmptyFile),
        Just(PathState::FileWithContent),
        Just(PathState::EmptyDir),
        Just(PathState::NonEmptyDir),
    ]
}

#[test]
fn test_gate_decisions() {
    let gate = ExecutionGate::new(false);
    let cases = [
        (PathState::Missing, true),
        (PathState::EmptyFile, false),
        (PathState::FileWithContent, false),
        (PathState::EmptyDir, true),
        (PathState::NonEmptyDir, false),
    ];

    for (state, expected) in cases {
        let dir = TempDir::new().unwrap();
        let path = prepare(dir.path(), state);
        assert_eq!(gate.is_run_required(&path), expected, "state {:?}", state);
    }
}

#[test]
fn test_nested_empty_directory_counts_as_entry() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    assert!(!ExecutionGate::new(false).is_run_required(dir.path()));
}

proptest! {
    #[test]
    fn prop_force_rerun_ignores_path_state(state in any_state()) {
        let dir = TempDir::new().unwrap();
        let path = prepare(dir.path(), state);
        prop_assert!(ExecutionGate::new(true).is_run_required(&path));
    }
}
