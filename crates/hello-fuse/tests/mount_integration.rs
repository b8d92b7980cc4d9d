//! Integration tests for the fuser-backed filesystem
//!
//! These check the served tree and the mount options built from a parsed
//! command line without performing a real mount (which requires privileges).

#![cfg(feature = "fuse")]

use clap::Parser;
use fuser::{FileType, MountOption};

use hello_fuse::cli::Args;
use hello_fuse::fuse::{mount_options, StaticContent, StaticFs, FILE_INODE, FILE_NAME};
use hello_fuse::{Identity, MountConfig};

fn config_from(argv: &[&str]) -> MountConfig {
    Args::try_parse_from(argv)
        .unwrap()
        .to_config(Identity { uid: 1000, gid: 100 })
}

#[test]
fn test_tree_reflects_identity() {
    let config = config_from(&["hello-fuse", "/mnt/hello"]);
    let fs = StaticFs::new(StaticContent::hello(), &config);

    let root = fs.attr(1).unwrap();
    assert_eq!(root.kind, FileType::Directory);
    assert_eq!(root.perm, 0o755);
    assert_eq!((root.uid, root.gid), (1000, 100));

    let file = fs.lookup_child(1, FILE_NAME).unwrap();
    assert_eq!(file.ino, FILE_INODE);
    assert_eq!(file.kind, FileType::RegularFile);
    assert_eq!(file.size, 8);
    assert_eq!(file.perm, 0o644);
    assert_eq!((file.uid, file.gid), (1000, 100));
}

#[test]
fn test_root_listing() {
    let config = config_from(&["hello-fuse", "/mnt/hello"]);
    let fs = StaticFs::new(StaticContent::hello(), &config);

    let names: Vec<_> = fs
        .entries(1)
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, vec![".", "..", FILE_NAME]);

    assert_eq!(fs.lookup_child(1, "missing.txt").unwrap_err(), libc::ENOENT);
    assert_eq!(fs.entries(FILE_INODE).unwrap_err(), libc::ENOTDIR);
}

#[test]
fn test_mount_options_from_command_line() {
    let config = config_from(&[
        "hello-fuse",
        "--allow-other",
        "--fs-name",
        "demo",
        "--name",
        "hello",
        "--options",
        "ro,default_permissions",
        "/mnt/hello",
    ]);

    assert_eq!(
        mount_options(&config),
        vec![
            MountOption::FSName("demo".to_string()),
            MountOption::Subtype("hello".to_string()),
            MountOption::AllowOther,
            MountOption::CUSTOM("ro".to_string()),
            MountOption::CUSTOM("default_permissions".to_string()),
        ]
    );
}
