//! # hello-fuse
//!
//! Mounts a FUSE filesystem holding one static file and keeps it mounted
//! until a shutdown signal or an external unmount.

pub mod cli;
pub mod config;
pub mod fuse;
pub mod identity;
pub mod lifecycle;
pub mod logging;
pub mod mount;

pub use config::MountConfig;
pub use identity::{Identity, IdentityError};
pub use lifecycle::{
    exit_code, Coordinator, LifecycleError, LifecycleState, Shutdown, ShutdownSignal,
};
pub use mount::{MountError, MountHandle, MountService};
