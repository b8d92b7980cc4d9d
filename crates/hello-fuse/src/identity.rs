//! UID/GID resolution
//!
//! The command line takes signed ids where `-1` means "whoever runs the
//! process". Resolution turns those into the concrete owner reported for
//! every node of the mounted tree.

use nix::unistd::{getgid, getuid, User};

/// Requested id meaning "use the current process identity"
pub const UNSPECIFIED_ID: i64 = -1;

/// Concrete owner of the mounted tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("user database lookup failed: {0}")]
    Lookup(#[from] nix::Error),
    #[error("no user database entry for uid {0}")]
    UnknownUser(u32),
    #[error("{0} {1} is not a valid id")]
    OutOfRange(&'static str, i64),
}

/// Resolve requested ids against the current process identity
pub fn resolve(requested_uid: i64, requested_gid: i64) -> Result<Identity, IdentityError> {
    resolve_with(requested_uid, requested_gid, current)
}

/// Resolve requested ids, calling `current` at most once and only when a
/// sentinel needs substituting
pub fn resolve_with<F>(
    requested_uid: i64,
    requested_gid: i64,
    current: F,
) -> Result<Identity, IdentityError>
where
    F: FnOnce() -> Result<Identity, IdentityError>,
{
    // Explicit ids never consult the user database, so a process without a
    // passwd entry can still mount with `--uid`/`--gid` given.
    let process = if requested_uid == UNSPECIFIED_ID || requested_gid == UNSPECIFIED_ID {
        Some(current()?)
    } else {
        None
    };

    let uid = match (requested_uid, process) {
        (UNSPECIFIED_ID, Some(process)) => process.uid,
        (uid, _) => to_id("uid", uid)?,
    };
    let gid = match (requested_gid, process) {
        (UNSPECIFIED_ID, Some(process)) => process.gid,
        (gid, _) => to_id("gid", gid)?,
    };

    Ok(Identity { uid, gid })
}

/// Real uid/gid of this process, confirmed against the user database
pub fn current() -> Result<Identity, IdentityError> {
    let uid = getuid();
    let user = User::from_uid(uid)?.ok_or(IdentityError::UnknownUser(uid.as_raw()))?;
    tracing::debug!("Current user: {} ({})", user.name, uid);

    Ok(Identity {
        uid: uid.as_raw(),
        gid: getgid().as_raw(),
    })
}

fn to_id(kind: &'static str, value: i64) -> Result<u32, IdentityError> {
    u32::try_from(value).map_err(|_| IdentityError::OutOfRange(kind, value))
}
