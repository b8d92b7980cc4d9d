//! Mount configuration
//!
//! `MountConfig` is built once from the command line (see [`crate::cli`]) and
//! handed by reference to the lifecycle coordinator and the mount service.
//! Nothing mutates it after construction.

use std::time::Duration;

use crate::identity::Identity;

/// Default cache lifetime for entries, attributes and negative entries
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default bound on how long the mount call may take
pub const DEFAULT_MOUNT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default number of background requests the kernel may queue
pub const DEFAULT_MAX_BACKGROUND: u16 = 12;
/// Default filesystem stacking depth
pub const DEFAULT_MAX_STACK_DEPTH: u32 = 1;
/// Filesystem name reported in the mount table when none is given
pub const DEFAULT_FS_NAME: &str = "hello-fuse";

/// Everything the mount service and the filesystem need to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
    /// How long the kernel may cache a successful lookup
    pub entry_timeout: Duration,
    /// How long the kernel may cache inode attributes
    pub attr_timeout: Duration,
    /// How long the kernel may cache a failed lookup
    pub negative_timeout: Duration,
    /// Bound on mount establishment
    pub mount_timeout: Duration,
    /// First inode handed to nodes without a stable number (0 = after the stable ones)
    pub first_automatic_ino: u64,
    /// Report zero mode bits as-is instead of substituting defaults
    pub null_permissions: bool,
    /// Owner reported for every node
    pub identity: Identity,
    pub debug: bool,
    pub allow_other: bool,
    pub max_background: u16,
    /// Zero leaves the kernel default in place
    pub max_write: u32,
    /// Zero leaves the kernel default in place
    pub max_read_ahead: u32,
    pub ignore_security_labels: bool,
    pub remember_inodes: bool,
    /// Source name shown in the mount table
    pub fs_name: Option<String>,
    /// Filesystem subtype (`fuse.<name>`)
    pub name: Option<String>,
    pub single_threaded: bool,
    pub disable_xattrs: bool,
    pub enable_locks: bool,
    pub enable_symlink_caching: bool,
    pub explicit_data_cache_control: bool,
    pub sync_read: bool,
    pub direct_mount: bool,
    pub direct_mount_strict: bool,
    pub direct_mount_flags: u32,
    pub enable_acl: bool,
    pub disable_readdirplus: bool,
    pub disable_splice: bool,
    pub max_stack_depth: u32,
    pub id_mapped_mount: bool,
    /// Extra `-o` options passed verbatim to the mount
    pub options: Vec<String>,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            entry_timeout: DEFAULT_CACHE_TIMEOUT,
            attr_timeout: DEFAULT_CACHE_TIMEOUT,
            negative_timeout: DEFAULT_CACHE_TIMEOUT,
            mount_timeout: DEFAULT_MOUNT_TIMEOUT,
            first_automatic_ino: 0,
            null_permissions: false,
            identity: Identity::default(),
            debug: false,
            allow_other: false,
            max_background: DEFAULT_MAX_BACKGROUND,
            max_write: 0,
            max_read_ahead: 0,
            ignore_security_labels: false,
            remember_inodes: false,
            fs_name: None,
            name: None,
            single_threaded: false,
            disable_xattrs: false,
            enable_locks: false,
            enable_symlink_caching: false,
            explicit_data_cache_control: false,
            sync_read: false,
            direct_mount: false,
            direct_mount_strict: false,
            direct_mount_flags: 0,
            enable_acl: false,
            disable_readdirplus: false,
            disable_splice: false,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            id_mapped_mount: false,
            options: Vec::new(),
        }
    }
}

impl MountConfig {
    /// Source name for the mount table, falling back to the crate default
    pub fn fs_name(&self) -> &str {
        self.fs_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FS_NAME)
    }

    /// Split a comma-separated option string, dropping empty segments
    pub fn parse_options(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|opt| !opt.is_empty())
            .map(str::to_string)
            .collect()
    }
}
