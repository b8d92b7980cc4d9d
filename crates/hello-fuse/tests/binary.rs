//! Exit behaviour of the `hello-fuse` binary on paths that never mount

#![cfg(feature = "fuse")]

use std::process::{Command, Output};

fn hello_fuse(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_hello-fuse"));
    command.args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("HELLO_FUSE_") {
            command.env_remove(key);
        }
    }
    command.output().unwrap()
}

#[test]
fn test_no_mountpoint_prints_usage() {
    let output = hello_fuse(&[]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "Usage:\n  hello-fuse [flags] MOUNTPOINT\n");
}

#[test]
fn test_flags_without_mountpoint_print_usage() {
    let output = hello_fuse(&["--debug", "--mountTimeout", "1s"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Usage:"));
}

#[test]
fn test_invalid_identity_exits_one() {
    let dir = tempfile::TempDir::new().unwrap();
    let mountpoint = dir.path().to_str().unwrap();
    let output = hello_fuse(&["--uid", "-5", "--gid", "-5", mountpoint]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error resolving UID/GID"));
}
