//! Post-mount readiness probe
//!
//! A successful mount call does not mean the kernel is already routing
//! requests to us. The probe stats a known file under the mount point until it
//! answers or the attempts run out.

use std::path::Path;
use std::time::Duration;

/// How many times to stat, and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Every probe attempt failed
#[derive(Debug)]
pub struct ProbeFailure {
    pub attempts: u32,
    pub last_error: std::io::Error,
}

/// Stat `path` until it succeeds. Returns the 1-based attempt that succeeded.
pub async fn probe(path: &Path, policy: VerifyPolicy) -> Result<u32, ProbeFailure> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match tokio::fs::metadata(path).await {
            Ok(_) => {
                tracing::debug!("Probe of {} succeeded on attempt {}", path.display(), attempt);
                return Ok(attempt);
            }
            Err(e) if attempt >= attempts => {
                return Err(ProbeFailure {
                    attempts,
                    last_error: e,
                });
            }
            Err(e) => {
                tracing::debug!(
                    "Probe {}/{} of {} failed: {}",
                    attempt,
                    attempts,
                    path.display(),
                    e
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
