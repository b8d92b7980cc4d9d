//! Mount service abstraction
//!
//! The lifecycle coordinator only sees these traits. The production
//! implementation lives in [`crate::fuse::FuserMountService`]; tests plug in
//! their own to drive every lifecycle path without `/dev/fuse`.

use std::path::Path;

use async_trait::async_trait;

use crate::config::MountConfig;
use crate::fuse::StaticContent;

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("invalid mount point: {0}")]
    InvalidMountpoint(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("mount task aborted: {0}")]
    Aborted(String),
}

/// Attaches a filesystem to a directory
#[async_trait]
pub trait MountService: Send + Sync {
    type Handle: MountHandle;

    /// Mount `root` at `mountpoint`.
    ///
    /// May take arbitrarily long (busy or stale mount points); callers bound
    /// it with their own timeout.
    async fn mount(
        &self,
        mountpoint: &Path,
        root: StaticContent,
        config: &MountConfig,
    ) -> Result<Self::Handle, MountError>;
}

/// A live mount
#[async_trait]
pub trait MountHandle: Send + 'static {
    /// Resolves once the serve loop exits, usually because something
    /// unmounted the filesystem.
    async fn wait(self) -> Result<(), MountError>;
}
