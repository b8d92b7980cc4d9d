//! Command-line surface
//!
//! Every flag may also come from a `HELLO_FUSE_*` environment variable. Long
//! flags are kebab-case; the camelCase spellings are accepted as aliases.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::MountConfig;
use crate::identity::{Identity, UNSPECIFIED_ID};

/// Printed when no mount point is given
pub const USAGE: &str = "Usage:\n  hello-fuse [flags] MOUNTPOINT\n";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "hello-fuse", version, about = "Mount a filesystem exposing a single static file")]
pub struct Args {
    /// Print debug data
    #[arg(long, env = "HELLO_FUSE_DEBUG")]
    pub debug: bool,

    /// FUSE entry timeout
    #[arg(long, alias = "entryTimeout", env = "HELLO_FUSE_ENTRY_TIMEOUT", default_value = "1s", value_parser = humantime::parse_duration)]
    pub entry_timeout: Duration,

    /// FUSE attribute timeout
    #[arg(long, alias = "attrTimeout", env = "HELLO_FUSE_ATTR_TIMEOUT", default_value = "1s", value_parser = humantime::parse_duration)]
    pub attr_timeout: Duration,

    /// FUSE negative entry timeout
    #[arg(long, alias = "negativeTimeout", env = "HELLO_FUSE_NEGATIVE_TIMEOUT", default_value = "1s", value_parser = humantime::parse_duration)]
    pub negative_timeout: Duration,

    /// First automatic inode number
    #[arg(long, alias = "firstAutomaticIno", env = "HELLO_FUSE_FIRST_AUTOMATIC_INO", default_value_t = 0)]
    pub first_automatic_ino: u64,

    /// Support null permissions
    #[arg(long, alias = "nullPermissions", env = "HELLO_FUSE_NULL_PERMISSIONS")]
    pub null_permissions: bool,

    /// User id (-1 for the current user)
    #[arg(long, env = "HELLO_FUSE_UID", default_value_t = UNSPECIFIED_ID, allow_negative_numbers = true)]
    pub uid: i64,

    /// Group id (-1 for the current group)
    #[arg(long, env = "HELLO_FUSE_GID", default_value_t = UNSPECIFIED_ID, allow_negative_numbers = true)]
    pub gid: i64,

    /// Allow other users to access the file system
    #[arg(long, alias = "allowOther", env = "HELLO_FUSE_ALLOW_OTHER")]
    pub allow_other: bool,

    /// Max number of background requests
    #[arg(long, alias = "maxBackground", env = "HELLO_FUSE_MAX_BACKGROUND", default_value_t = crate::config::DEFAULT_MAX_BACKGROUND)]
    pub max_background: u16,

    /// Max size for write requests
    #[arg(long, alias = "maxWrite", env = "HELLO_FUSE_MAX_WRITE", default_value_t = 0)]
    pub max_write: u32,

    /// Max read ahead size
    #[arg(long, alias = "maxReadAhead", env = "HELLO_FUSE_MAX_READ_AHEAD", default_value_t = 0)]
    pub max_read_ahead: u32,

    /// Ignore security labels
    #[arg(long, alias = "ignoreSecurityLabels", env = "HELLO_FUSE_IGNORE_SECURITY_LABELS")]
    pub ignore_security_labels: bool,

    /// Remember inodes
    #[arg(long, alias = "rememberInodes", env = "HELLO_FUSE_REMEMBER_INODES")]
    pub remember_inodes: bool,

    /// Filesystem name
    #[arg(long, alias = "fsName", env = "HELLO_FUSE_FS_NAME")]
    pub fs_name: Option<String>,

    /// Mount name
    #[arg(long, env = "HELLO_FUSE_NAME")]
    pub name: Option<String>,

    /// Single threaded
    #[arg(long, alias = "singleThreaded", env = "HELLO_FUSE_SINGLE_THREADED")]
    pub single_threaded: bool,

    /// Disable extended attributes
    #[arg(long, alias = "disableXAttrs", env = "HELLO_FUSE_DISABLE_XATTRS")]
    pub disable_xattrs: bool,

    /// Enable file locks
    #[arg(long, alias = "enableLocks", env = "HELLO_FUSE_ENABLE_LOCKS")]
    pub enable_locks: bool,

    /// Enable symlink caching
    #[arg(long, alias = "enableSymlinkCaching", env = "HELLO_FUSE_ENABLE_SYMLINK_CACHING")]
    pub enable_symlink_caching: bool,

    /// Explicit data cache control
    #[arg(long, alias = "explicitDataCacheControl", env = "HELLO_FUSE_EXPLICIT_DATA_CACHE_CONTROL")]
    pub explicit_data_cache_control: bool,

    /// Synchronous read
    #[arg(long, alias = "syncRead", env = "HELLO_FUSE_SYNC_READ")]
    pub sync_read: bool,

    /// Direct mount
    #[arg(long, alias = "directMount", env = "HELLO_FUSE_DIRECT_MOUNT")]
    pub direct_mount: bool,

    /// Strict direct mount
    #[arg(long, alias = "directMountStrict", env = "HELLO_FUSE_DIRECT_MOUNT_STRICT")]
    pub direct_mount_strict: bool,

    /// Direct mount flags
    #[arg(long, alias = "directMountFlags", env = "HELLO_FUSE_DIRECT_MOUNT_FLAGS", default_value_t = 0)]
    pub direct_mount_flags: u32,

    /// Enable ACL support
    #[arg(long, alias = "enableAcl", env = "HELLO_FUSE_ENABLE_ACL")]
    pub enable_acl: bool,

    /// Disable readdirplus
    #[arg(long, alias = "disableReadDirPlus", env = "HELLO_FUSE_DISABLE_READDIRPLUS")]
    pub disable_readdirplus: bool,

    /// Disable splice
    #[arg(long, alias = "disableSplice", env = "HELLO_FUSE_DISABLE_SPLICE")]
    pub disable_splice: bool,

    /// Maximum stacking depth
    #[arg(long, alias = "maxStackDepth", env = "HELLO_FUSE_MAX_STACK_DEPTH", default_value_t = crate::config::DEFAULT_MAX_STACK_DEPTH)]
    pub max_stack_depth: u32,

    /// ID-mapped mount
    #[arg(long, alias = "idMappedMount", env = "HELLO_FUSE_ID_MAPPED_MOUNT")]
    pub id_mapped_mount: bool,

    /// Comma-separated mount options
    #[arg(long, env = "HELLO_FUSE_OPTIONS", default_value = "")]
    pub options: String,

    /// Timeout for mounting the filesystem
    #[arg(long, alias = "mountTimeout", env = "HELLO_FUSE_MOUNT_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    pub mount_timeout: Duration,

    /// Directory to mount on
    #[arg(value_name = "MOUNTPOINT")]
    pub mountpoint: Option<PathBuf>,
}

impl Args {
    /// Build the mount configuration for an already-resolved identity
    pub fn to_config(&self, identity: Identity) -> MountConfig {
        MountConfig {
            entry_timeout: self.entry_timeout,
            attr_timeout: self.attr_timeout,
            negative_timeout: self.negative_timeout,
            mount_timeout: self.mount_timeout,
            first_automatic_ino: self.first_automatic_ino,
            null_permissions: self.null_permissions,
            identity,
            debug: self.debug,
            allow_other: self.allow_other,
            max_background: self.max_background,
            max_write: self.max_write,
            max_read_ahead: self.max_read_ahead,
            ignore_security_labels: self.ignore_security_labels,
            remember_inodes: self.remember_inodes,
            fs_name: self.fs_name.clone(),
            name: self.name.clone(),
            single_threaded: self.single_threaded,
            disable_xattrs: self.disable_xattrs,
            enable_locks: self.enable_locks,
            enable_symlink_caching: self.enable_symlink_caching,
            explicit_data_cache_control: self.explicit_data_cache_control,
            sync_read: self.sync_read,
            direct_mount: self.direct_mount,
            direct_mount_strict: self.direct_mount_strict,
            direct_mount_flags: self.direct_mount_flags,
            enable_acl: self.enable_acl,
            disable_readdirplus: self.disable_readdirplus,
            disable_splice: self.disable_splice,
            max_stack_depth: self.max_stack_depth,
            id_mapped_mount: self.id_mapped_mount,
            options: MountConfig::parse_options(&self.options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_config() {
        let args = Args::try_parse_from(["hello-fuse", "/mnt/hello"]).unwrap();
        assert_eq!(args.uid, UNSPECIFIED_ID);
        assert_eq!(args.gid, UNSPECIFIED_ID);
        assert_eq!(args.mountpoint, Some(PathBuf::from("/mnt/hello")));
        assert_eq!(args.to_config(Identity::default()), MountConfig::default());
    }
}
