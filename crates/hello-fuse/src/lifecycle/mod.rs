//! Mount-and-shutdown lifecycle
//!
//! The coordinator drives a single mount from start to exit:
//!
//! ```text
//! Idle → Mounting → MountTimedOut | MountFailed | Mounted
//! Mounted → Verifying → Ready → ShuttingDown → Terminated
//! Mounted | Verifying | Ready → Terminated   (serve loop ended on its own)
//! ```
//!
//! The mount call is raced against the configured timeout. Once mounted, the
//! readiness probe, the shutdown signal and the serve loop are polled
//! together; whichever settles first decides how the run ends. Only the
//! signal path unmounts, and it does so at most once.

mod signal;
mod state;
mod unmount;
mod verify;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

pub use signal::{ShutdownSignal, ShutdownSignals};
pub use state::LifecycleState;
pub use unmount::{CommandUnmounter, UnmountError, Unmounter, DEFAULT_UNMOUNT_PROGRAM};
pub use verify::{probe, ProbeFailure, VerifyPolicy};

use crate::config::MountConfig;
use crate::fuse::StaticContent;
use crate::mount::{MountError, MountHandle, MountService};

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// A signal arrived and the unmount command succeeded
    Signal(ShutdownSignal),
    /// The serve loop returned on its own, e.g. after an external unmount
    Unmounted,
}

/// Process exit status for a finished run: 0 after any clean shutdown, 1 on error
pub fn exit_code(result: &Result<Shutdown, LifecycleError>) -> i32 {
    match result {
        Ok(Shutdown::Signal(_)) | Ok(Shutdown::Unmounted) => 0,
        Err(_) => 1,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),
    #[error("Mount fail: {0}")]
    Mount(#[from] MountError),
    #[error(
        "ERROR: Mount failed timed out after {}\nHint: Perhaps mount directory busy? try running 'umount {}'",
        humantime::format_duration(*.timeout),
        .mountpoint.display()
    )]
    MountTimeout {
        timeout: Duration,
        mountpoint: PathBuf,
    },
    #[error("Mount failed, error stating {} after {attempts} attempts: {source}", .path.display())]
    Verification {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to unmount: {0}")]
    Unmount(#[from] UnmountError),
}

/// Drives one mount through its lifecycle
#[derive(Debug)]
pub struct Coordinator<M, U> {
    mount_service: M,
    unmounter: U,
    mountpoint: PathBuf,
    content: StaticContent,
    config: MountConfig,
    verify: VerifyPolicy,
    state: LifecycleState,
}

impl<M, U> Coordinator<M, U>
where
    M: MountService,
    U: Unmounter,
{
    pub fn new(
        mount_service: M,
        unmounter: U,
        mountpoint: impl Into<PathBuf>,
        config: MountConfig,
    ) -> Self {
        Self {
            mount_service,
            unmounter,
            mountpoint: mountpoint.into(),
            content: StaticContent::hello(),
            config,
            verify: VerifyPolicy::default(),
            state: LifecycleState::Idle,
        }
    }

    /// Serve a different tree
    pub fn with_content(mut self, content: StaticContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_verify_policy(mut self, verify: VerifyPolicy) -> Self {
        self.verify = verify;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn mountpoint(&self) -> &Path {
        &self.mountpoint
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!("Lifecycle {}: {} -> {}", self.mountpoint.display(), self.state, next);
        self.state = next;
    }

    /// Mount, verify, and wait for `shutdown` or the end of the serve loop.
    ///
    /// After a timeout the pending mount call is dropped but not cancelled;
    /// a blocking mount keeps its thread until it returns, and its result
    /// goes nowhere.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<Shutdown, LifecycleError>
    where
        F: Future<Output = ShutdownSignal>,
    {
        self.transition(LifecycleState::Mounting);
        info!(
            "Mounting {} (timeout {})",
            self.mountpoint.display(),
            humantime::format_duration(self.config.mount_timeout)
        );

        let mounted = tokio::time::timeout(
            self.config.mount_timeout,
            self.mount_service
                .mount(&self.mountpoint, self.content.clone(), &self.config),
        )
        .await;

        let handle = match mounted {
            Err(_) => {
                self.transition(LifecycleState::MountTimedOut);
                return Err(LifecycleError::MountTimeout {
                    timeout: self.config.mount_timeout,
                    mountpoint: self.mountpoint.clone(),
                });
            }
            Ok(Err(e)) => {
                self.transition(LifecycleState::MountFailed);
                return Err(e.into());
            }
            Ok(Ok(handle)) => handle,
        };
        self.transition(LifecycleState::Mounted);

        let probe_path = self.mountpoint.join(self.content.probe_name());
        let probe = verify::probe(&probe_path, self.verify);
        let serve = handle.wait();
        tokio::pin!(probe, serve, shutdown);

        self.transition(LifecycleState::Verifying);
        let mut verified = false;
        loop {
            tokio::select! {
                result = &mut probe, if !verified => match result {
                    Ok(_) => {
                        verified = true;
                        self.transition(LifecycleState::Ready);
                        info!("Mount ready");
                    }
                    Err(failure) => {
                        self.transition(LifecycleState::Terminated);
                        return Err(LifecycleError::Verification {
                            path: probe_path.clone(),
                            attempts: failure.attempts,
                            source: failure.last_error,
                        });
                    }
                },
                signal = &mut shutdown => {
                    info!("Received signal {}, Closing gracefully", signal);
                    self.transition(LifecycleState::ShuttingDown);
                    self.unmounter.unmount(&self.mountpoint).await?;
                    self.transition(LifecycleState::Terminated);
                    return Ok(Shutdown::Signal(signal));
                }
                result = &mut serve => {
                    if let Err(e) = result {
                        warn!("Serve loop ended with error: {}", e);
                    }
                    info!("{} was unmounted", self.mountpoint.display());
                    self.transition(LifecycleState::Terminated);
                    return Ok(Shutdown::Unmounted);
                }
            }
        }
    }
}
