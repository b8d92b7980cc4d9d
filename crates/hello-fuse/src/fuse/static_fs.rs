//! FUSE filesystem over the static tree
//!
//! Answers lookup, getattr, open, read, readdir(plus) and xattr requests for
//! the root directory and the files of a [`StaticContent`]. Everything is
//! read-only; write-side operations fall through to fuser's `ENOSYS`
//! defaults.

use std::ffi::OsStr;
use std::time::{Duration, SystemTime};

use fuser::{
    consts, FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyDirectoryPlus, ReplyEntry, ReplyOpen, ReplyXattr, Request,
};
use libc::c_int;
use tracing::{debug, info, trace, warn};

use super::content::{StaticContent, StaticFileNode};
use super::inode_table::InodeTable;
use crate::config::MountConfig;

/// Block size reported in attributes
const BLOCK_SIZE: u32 = 512;
/// Mode substituted for zero file permissions unless null permissions are on
const DEFAULT_FILE_PERM: u16 = 0o644;
/// Mode substituted for zero directory permissions unless null permissions are on
const DEFAULT_DIR_PERM: u16 = 0o755;

/// One directory listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub ino: u64,
    pub kind: FileType,
    pub name: String,
}

enum Node<'a> {
    Root,
    File(&'a StaticFileNode),
}

/// Read-only FUSE filesystem serving a [`StaticContent`]
#[derive(Debug)]
pub struct StaticFs {
    content: StaticContent,
    inodes: InodeTable,
    config: MountConfig,
    created: SystemTime,
}

impl StaticFs {
    pub fn new(content: StaticContent, config: &MountConfig) -> Self {
        let mut inodes = InodeTable::new(config.first_automatic_ino);

        // Stable numbers first so automatic ones never take them
        for file in content.files.iter() {
            if let Some(ino) = file.ino {
                if !inodes.insert_stable(&file.name, ino) {
                    warn!(
                        "Inode {} for {} already taken, numbering automatically",
                        ino, file.name
                    );
                }
            }
        }
        for file in content.files.iter() {
            let ino = inodes.get_or_create(&file.name);
            trace!("Registered {} as inode {}", file.name, ino);
        }

        Self {
            content,
            inodes,
            config: config.clone(),
            created: SystemTime::now(),
        }
    }

    fn node(&self, ino: u64) -> Option<Node<'_>> {
        if ino == InodeTable::ROOT_INODE {
            return Some(Node::Root);
        }
        let path = self.inodes.get_path(ino)?;
        self.content
            .file(InodeTable::filename(path))
            .map(Node::File)
    }

    fn perm(&self, mode: u16, default: u16) -> u16 {
        if mode == 0 && !self.config.null_permissions {
            default
        } else {
            mode & 0o7777
        }
    }

    /// Attributes for an inode, if it exists
    pub fn attr(&self, ino: u64) -> Option<FileAttr> {
        let (kind, perm, size, nlink) = match self.node(ino)? {
            Node::Root => (
                FileType::Directory,
                self.perm(self.content.root_mode, DEFAULT_DIR_PERM),
                0,
                2,
            ),
            Node::File(file) => (
                FileType::RegularFile,
                self.perm(file.mode, DEFAULT_FILE_PERM),
                file.size(),
                1,
            ),
        };

        Some(FileAttr {
            ino,
            size,
            blocks: size.div_ceil(u64::from(BLOCK_SIZE)),
            atime: self.created,
            mtime: self.created,
            ctime: self.created,
            crtime: self.created,
            kind,
            perm,
            nlink,
            uid: self.config.identity.uid,
            gid: self.config.identity.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        })
    }

    /// Attributes of a negative entry; inode 0 tells the kernel the name is absent
    fn negative_attr(&self) -> FileAttr {
        FileAttr {
            ino: 0,
            size: 0,
            blocks: 0,
            atime: self.created,
            mtime: self.created,
            ctime: self.created,
            crtime: self.created,
            kind: FileType::RegularFile,
            perm: 0,
            nlink: 0,
            uid: 0,
            gid: 0,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }

    /// Resolve `name` under `parent`
    pub fn lookup_child(&self, parent: u64, name: &str) -> Result<FileAttr, c_int> {
        match self.node(parent) {
            Some(Node::Root) => {}
            Some(Node::File(_)) => return Err(libc::ENOTDIR),
            None => return Err(libc::ENOENT),
        }
        self.inodes
            .lookup(parent, name)
            .and_then(|ino| self.attr(ino))
            .ok_or(libc::ENOENT)
    }

    /// Full listing of a directory, `.` and `..` included
    pub fn entries(&self, ino: u64) -> Result<Vec<DirEntry>, c_int> {
        match self.node(ino) {
            Some(Node::Root) => {}
            Some(Node::File(_)) => return Err(libc::ENOTDIR),
            None => return Err(libc::ENOENT),
        }

        let dir_path = self.inodes.get_path(ino).unwrap_or("/");
        let parent = self
            .inodes
            .get_inode(&InodeTable::parent_path(dir_path))
            .unwrap_or(InodeTable::ROOT_INODE);

        let mut entries = vec![
            DirEntry {
                ino,
                kind: FileType::Directory,
                name: ".".to_string(),
            },
            DirEntry {
                ino: parent,
                kind: FileType::Directory,
                name: "..".to_string(),
            },
        ];
        entries.extend(self.content.files.iter().filter_map(|file| {
            self.inodes.lookup(ino, &file.name).map(|child| DirEntry {
                ino: child,
                kind: FileType::RegularFile,
                name: file.name.clone(),
            })
        }));
        Ok(entries)
    }

    fn entry_ttl(&self) -> &Duration {
        &self.config.entry_timeout
    }
}

impl Filesystem for StaticFs {
    fn init(&mut self, _req: &Request<'_>, config: &mut KernelConfig) -> Result<(), c_int> {
        let mut wanted = 0;
        if !self.config.sync_read {
            wanted |= consts::FUSE_ASYNC_READ;
        }
        if self.config.enable_locks {
            wanted |= consts::FUSE_POSIX_LOCKS | consts::FUSE_FLOCK_LOCKS;
        }
        if self.config.enable_acl {
            wanted |= consts::FUSE_POSIX_ACL;
        }
        if self.config.enable_symlink_caching {
            wanted |= consts::FUSE_CACHE_SYMLINKS;
        }
        if self.config.explicit_data_cache_control {
            wanted |= consts::FUSE_EXPLICIT_INVAL_DATA;
        }
        if !self.config.disable_readdirplus {
            wanted |= consts::FUSE_DO_READDIRPLUS | consts::FUSE_READDIRPLUS_AUTO;
        }

        if wanted != 0 {
            if let Err(unsupported) = config.add_capabilities(wanted) {
                warn!("Kernel lacks requested capabilities {:#x}", unsupported);
                config.add_capabilities(wanted & !unsupported).ok();
            }
        }

        if self.config.max_write > 0 {
            if let Err(nearest) = config.set_max_write(self.config.max_write) {
                warn!(
                    "Failed to set max_write to {}, nearest allowed: {}",
                    self.config.max_write, nearest
                );
            }
        }
        if self.config.max_read_ahead > 0 {
            if let Err(nearest) = config.set_max_readahead(self.config.max_read_ahead) {
                warn!(
                    "Failed to set max_readahead to {}, nearest allowed: {}",
                    self.config.max_read_ahead, nearest
                );
            }
        }
        if let Err(nearest) = config.set_max_background(self.config.max_background) {
            warn!(
                "Failed to set max_background to {}, nearest allowed: {}",
                self.config.max_background, nearest
            );
        }

        info!("FUSE filesystem initialized");
        Ok(())
    }

    fn destroy(&mut self) {
        info!("FUSE filesystem destroyed");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(name) = name.to_str() else {
            reply.error(libc::ENOENT);
            return;
        };
        trace!(parent = parent, name = name, "lookup");

        match self.lookup_child(parent, name) {
            Ok(attr) => reply.entry(self.entry_ttl(), &attr, 0),
            Err(libc::ENOENT) if !self.config.negative_timeout.is_zero() => {
                reply.entry(&self.config.negative_timeout, &self.negative_attr(), 0)
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        trace!(inode = ino, "getattr");
        match self.attr(ino) {
            Some(attr) => reply.attr(&self.config.attr_timeout, &attr),
            None => reply.error(libc::ENOENT),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!(inode = ino, flags = flags, "open");
        match self.node(ino) {
            Some(Node::File(_)) if flags & libc::O_ACCMODE != libc::O_RDONLY => {
                reply.error(libc::EACCES)
            }
            Some(Node::File(_)) => reply.opened(0, 0),
            Some(Node::Root) => reply.error(libc::EISDIR),
            None => reply.error(libc::ENOENT),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        trace!(inode = ino, offset = offset, size = size, "read");
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(libc::EINVAL);
            return;
        };
        match self.node(ino) {
            Some(Node::File(file)) => reply.data(file.read_at(offset, size)),
            Some(Node::Root) => reply.error(libc::EISDIR),
            None => reply.error(libc::ENOENT),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        trace!(inode = ino, offset = offset, "readdir");
        let entries = match self.entries(ino) {
            Ok(entries) => entries,
            Err(errno) => {
                reply.error(errno);
                return;
            }
        };

        let skip = usize::try_from(offset).unwrap_or(0);
        for (i, entry) in entries.iter().enumerate().skip(skip) {
            // Offset handed back is the index of the next entry
            if reply.add(entry.ino, (i + 1) as i64, entry.kind, &entry.name) {
                break;
            }
        }
        reply.ok();
    }

    fn readdirplus(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectoryPlus,
    ) {
        trace!(inode = ino, offset = offset, "readdirplus");
        if self.config.disable_readdirplus {
            reply.error(libc::ENOSYS);
            return;
        }
        let entries = match self.entries(ino) {
            Ok(entries) => entries,
            Err(errno) => {
                reply.error(errno);
                return;
            }
        };

        let skip = usize::try_from(offset).unwrap_or(0);
        for (i, entry) in entries.iter().enumerate().skip(skip) {
            let Some(attr) = self.attr(entry.ino) else {
                continue;
            };
            if reply.add(
                entry.ino,
                (i + 1) as i64,
                &entry.name,
                self.entry_ttl(),
                &attr,
                0,
            ) {
                break;
            }
        }
        reply.ok();
    }

    fn getxattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        name: &OsStr,
        _size: u32,
        reply: ReplyXattr,
    ) {
        if self.config.disable_xattrs {
            reply.error(libc::ENOSYS);
            return;
        }
        let is_security_label = name.to_str().is_some_and(|n| n.starts_with("security."));
        if self.config.ignore_security_labels && is_security_label {
            reply.error(libc::ENODATA);
            return;
        }
        debug!(inode = ino, name = ?name, "getxattr");
        match self.node(ino) {
            Some(_) => reply.error(libc::ENODATA),
            None => reply.error(libc::ENOENT),
        }
    }

    fn listxattr(&mut self, _req: &Request<'_>, ino: u64, size: u32, reply: ReplyXattr) {
        if self.config.disable_xattrs {
            reply.error(libc::ENOSYS);
            return;
        }
        match self.node(ino) {
            Some(_) if size == 0 => reply.size(0),
            Some(_) => reply.data(&[]),
            None => reply.error(libc::ENOENT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuse::content::{FILE_INODE, FILE_NAME};
    use crate::identity::Identity;

    fn config() -> MountConfig {
        MountConfig {
            identity: Identity {
                uid: 1000,
                gid: 1000,
            },
            ..MountConfig::default()
        }
    }

    #[test]
    fn test_root_attr() {
        let fs = StaticFs::new(StaticContent::hello(), &config());
        let attr = fs.attr(InodeTable::ROOT_INODE).unwrap();
        assert_eq!(attr.kind, FileType::Directory);
        assert_eq!(attr.perm, 0o755);
        assert_eq!(attr.uid, 1000);
        assert_eq!(attr.gid, 1000);
    }

    #[test]
    fn test_file_attr() {
        let fs = StaticFs::new(StaticContent::hello(), &config());
        let attr = fs.lookup_child(InodeTable::ROOT_INODE, FILE_NAME).unwrap();
        assert_eq!(attr.ino, FILE_INODE);
        assert_eq!(attr.kind, FileType::RegularFile);
        assert_eq!(attr.size, FILE_NAME.len() as u64);
        assert_eq!(attr.perm, 0o644);
        assert_eq!(attr.nlink, 1);
    }

    #[test]
    fn test_lookup_errors() {
        let fs = StaticFs::new(StaticContent::hello(), &config());
        assert_eq!(
            fs.lookup_child(InodeTable::ROOT_INODE, "missing").unwrap_err(),
            libc::ENOENT
        );
        assert_eq!(
            fs.lookup_child(FILE_INODE, "child").unwrap_err(),
            libc::ENOTDIR
        );
        assert_eq!(fs.lookup_child(99, "child").unwrap_err(), libc::ENOENT);
        assert!(fs.attr(99).is_none());
    }

    #[test]
    fn test_entries() {
        let fs = StaticFs::new(StaticContent::hello(), &config());
        let entries = fs.entries(InodeTable::ROOT_INODE).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".", "..", FILE_NAME]);
        assert_eq!(entries[1].ino, InodeTable::ROOT_INODE);
        assert_eq!(entries[2].ino, FILE_INODE);

        assert_eq!(fs.entries(FILE_INODE).unwrap_err(), libc::ENOTDIR);
    }

    #[test]
    fn test_null_permissions() {
        let mut content = StaticContent::hello();
        content.files[0].mode = 0;

        let fs = StaticFs::new(content.clone(), &config());
        assert_eq!(fs.attr(FILE_INODE).unwrap().perm, DEFAULT_FILE_PERM);

        let null = MountConfig {
            null_permissions: true,
            ..config()
        };
        let fs = StaticFs::new(content, &null);
        assert_eq!(fs.attr(FILE_INODE).unwrap().perm, 0);
    }

    #[test]
    fn test_conflicting_stable_inode_is_renumbered() {
        let mut content = StaticContent::hello();
        content.files.push(StaticFileNode {
            name: "clash.txt".to_string(),
            data: b"clash".to_vec(),
            mode: 0o600,
            ino: Some(FILE_INODE),
        });
        content.files.push(StaticFileNode {
            name: "auto.txt".to_string(),
            data: Vec::new(),
            mode: 0o600,
            ino: None,
        });

        let config = MountConfig {
            first_automatic_ino: 10,
            ..config()
        };
        let fs = StaticFs::new(content, &config);
        let clash = fs.lookup_child(InodeTable::ROOT_INODE, "clash.txt").unwrap();
        let auto = fs.lookup_child(InodeTable::ROOT_INODE, "auto.txt").unwrap();
        assert_eq!(clash.ino, 10);
        assert_eq!(auto.ino, 11);
        assert_eq!(
            fs.lookup_child(InodeTable::ROOT_INODE, FILE_NAME).unwrap().ino,
            FILE_INODE
        );
    }
}
