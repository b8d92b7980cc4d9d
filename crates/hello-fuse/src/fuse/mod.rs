//! FUSE filesystem for hello-fuse
//!
//! This module provides the static tree exposed at the mount point and, with
//! the `fuse` feature, the fuser glue that serves it.
//!
//! # Architecture
//!
//! - `StaticContent`: the root directory and its files, fixed at startup
//! - `InodeTable`: Bidirectional inode ↔ path mapping
//! - `StaticFs`: FUSE filesystem implementation using fuser
//! - `FuserMountService`: mounts a `StaticFs` and runs its serve loop

mod content;
mod inode_table;
#[cfg(feature = "fuse")]
mod session;
#[cfg(feature = "fuse")]
mod static_fs;

pub use content::{
    StaticContent, StaticFileNode, FILE_INODE, FILE_MODE, FILE_NAME, ROOT_MODE,
};
pub use inode_table::InodeTable;
#[cfg(feature = "fuse")]
pub use session::{mount_options, FuserMountHandle, FuserMountService};
#[cfg(feature = "fuse")]
pub use static_fs::{DirEntry, StaticFs};
