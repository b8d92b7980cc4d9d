//! Unmounting through the system `umount` command

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

/// Program run to unmount when none is given
pub const DEFAULT_UNMOUNT_PROGRAM: &str = "umount";

#[derive(Debug, thiserror::Error)]
pub enum UnmountError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Detaches a mounted filesystem
#[async_trait]
pub trait Unmounter: Send + Sync {
    async fn unmount(&self, mountpoint: &Path) -> Result<(), UnmountError>;
}

/// Runs an external unmount program against the mount point
#[derive(Debug, Clone)]
pub struct CommandUnmounter {
    program: String,
}

impl Default for CommandUnmounter {
    fn default() -> Self {
        Self::new(DEFAULT_UNMOUNT_PROGRAM)
    }
}

impl CommandUnmounter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Unmounter for CommandUnmounter {
    async fn unmount(&self, mountpoint: &Path) -> Result<(), UnmountError> {
        tracing::debug!("Running {} {}", self.program, mountpoint.display());
        let status = Command::new(&self.program)
            .arg(mountpoint)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| UnmountError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(UnmountError::Failed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        let unmounter = CommandUnmounter::new("true");
        unmounter.unmount(Path::new("/tmp")).await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_command() {
        let unmounter = CommandUnmounter::new("false");
        let err = unmounter.unmount(Path::new("/tmp")).await.unwrap_err();
        assert!(matches!(err, UnmountError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let unmounter = CommandUnmounter::new("hello-fuse-no-such-umount");
        let err = unmounter.unmount(Path::new("/tmp")).await.unwrap_err();
        assert!(matches!(err, UnmountError::Spawn { .. }));
    }

    #[test]
    fn test_default_program() {
        assert_eq!(CommandUnmounter::default().program(), "umount");
    }
}
