//! fuser-backed mount service
//!
//! `fuser::Session::new` performs the mount and can block indefinitely, so it
//! runs on the blocking pool. Once it returns, the session's serve loop is
//! started on another blocking thread right away: the kernel will not answer
//! requests against the mount point until the INIT handshake is served.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fuser::{MountOption, Session};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::content::StaticContent;
use super::static_fs::StaticFs;
use crate::config::MountConfig;
use crate::mount::{MountError, MountHandle, MountService};

/// Mounts a [`StaticFs`] through fuser
#[derive(Debug, Clone, Copy, Default)]
pub struct FuserMountService;

/// Serve loop of a fuser session
#[derive(Debug)]
pub struct FuserMountHandle {
    mountpoint: PathBuf,
    serve: JoinHandle<io::Result<()>>,
}

/// Translate the configuration into fuser mount options
pub fn mount_options(config: &MountConfig) -> Vec<MountOption> {
    let mut options = vec![MountOption::FSName(config.fs_name().to_string())];

    if let Some(name) = config.name.as_deref().filter(|name| !name.is_empty()) {
        options.push(MountOption::Subtype(name.to_string()));
    }
    if config.allow_other {
        options.push(MountOption::AllowOther);
    }
    options.extend(config.options.iter().cloned().map(MountOption::CUSTOM));

    options
}

/// Options fuser has no knob for; recorded so a debug run shows what was asked
fn log_unmapped(config: &MountConfig) {
    debug!(
        single_threaded = config.single_threaded,
        remember_inodes = config.remember_inodes,
        direct_mount = config.direct_mount,
        direct_mount_strict = config.direct_mount_strict,
        direct_mount_flags = config.direct_mount_flags,
        disable_splice = config.disable_splice,
        max_stack_depth = config.max_stack_depth,
        id_mapped_mount = config.id_mapped_mount,
        "Options handled by fuser defaults"
    );
}

#[async_trait]
impl MountService for FuserMountService {
    type Handle = FuserMountHandle;

    async fn mount(
        &self,
        mountpoint: &Path,
        root: StaticContent,
        config: &MountConfig,
    ) -> Result<FuserMountHandle, MountError> {
        if mountpoint.as_os_str().is_empty() {
            return Err(MountError::InvalidMountpoint(
                "mount point cannot be empty".to_string(),
            ));
        }

        let options = mount_options(config);
        log_unmapped(config);
        debug!("Mount options: {:?}", options);

        let fs = StaticFs::new(root, config);
        let path = mountpoint.to_path_buf();
        let session = tokio::task::spawn_blocking(move || Session::new(fs, &path, &options))
            .await
            .map_err(|e| MountError::Aborted(e.to_string()))??;
        info!("FUSE session established at {}", mountpoint.display());

        let serve = tokio::task::spawn_blocking(move || {
            let mut session = session;
            session.run()
        });

        Ok(FuserMountHandle {
            mountpoint: mountpoint.to_path_buf(),
            serve,
        })
    }
}

#[async_trait]
impl MountHandle for FuserMountHandle {
    async fn wait(self) -> Result<(), MountError> {
        let result = self
            .serve
            .await
            .map_err(|e| MountError::Aborted(e.to_string()))?;
        debug!("Serve loop for {} exited", self.mountpoint.display());
        result.map_err(MountError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = mount_options(&MountConfig::default());
        assert_eq!(
            options,
            vec![MountOption::FSName("hello-fuse".to_string())]
        );
    }

    #[test]
    fn test_full_options() {
        let config = MountConfig {
            fs_name: Some("demo".to_string()),
            name: Some("hello".to_string()),
            allow_other: true,
            options: vec!["noatime".to_string(), "nosuid".to_string()],
            ..MountConfig::default()
        };
        let options = mount_options(&config);
        assert_eq!(
            options,
            vec![
                MountOption::FSName("demo".to_string()),
                MountOption::Subtype("hello".to_string()),
                MountOption::AllowOther,
                MountOption::CUSTOM("noatime".to_string()),
                MountOption::CUSTOM("nosuid".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_mountpoint_rejected() {
        let result = FuserMountService
            .mount(
                Path::new(""),
                StaticContent::hello(),
                &MountConfig::default(),
            )
            .await;
        assert!(matches!(result, Err(MountError::InvalidMountpoint(_))));
    }
}
