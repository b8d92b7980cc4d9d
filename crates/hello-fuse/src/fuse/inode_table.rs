//! Bidirectional inode ↔ path mapping for the static tree
//!
//! FUSE identifies nodes by 64-bit inode numbers. Nodes with a stable number
//! are registered explicitly; everything else is numbered from the configured
//! first automatic inode upward, skipping numbers already taken.

use std::collections::HashMap;

/// Bidirectional mapping between inodes and paths
#[derive(Debug)]
pub struct InodeTable {
    /// Path to inode mapping
    path_to_inode: HashMap<String, u64>,
    /// Inode to path mapping
    inode_to_path: HashMap<u64, String>,
    /// Next candidate for automatic numbering
    next_inode: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new(0)
    }
}

impl InodeTable {
    /// Root inode number (always 1 in FUSE)
    pub const ROOT_INODE: u64 = 1;

    /// Create a table with root pre-registered.
    ///
    /// `first_automatic_ino` below 2 means "start right after root".
    pub fn new(first_automatic_ino: u64) -> Self {
        let mut table = Self {
            path_to_inode: HashMap::new(),
            inode_to_path: HashMap::new(),
            next_inode: first_automatic_ino.max(Self::ROOT_INODE + 1),
        };

        table
            .path_to_inode
            .insert("/".to_string(), Self::ROOT_INODE);
        table
            .inode_to_path
            .insert(Self::ROOT_INODE, "/".to_string());

        table
    }

    /// Register a path under a fixed inode number.
    ///
    /// Returns false if either the path or the number is already taken.
    pub fn insert_stable(&mut self, path: &str, inode: u64) -> bool {
        let normalized = Self::normalize_path(path);
        if inode == 0
            || self.path_to_inode.contains_key(&normalized)
            || self.inode_to_path.contains_key(&inode)
        {
            return false;
        }

        self.path_to_inode.insert(normalized.clone(), inode);
        self.inode_to_path.insert(inode, normalized);
        true
    }

    /// Get or create an inode for a path
    pub fn get_or_create(&mut self, path: &str) -> u64 {
        let normalized = Self::normalize_path(path);

        if let Some(&inode) = self.path_to_inode.get(&normalized) {
            return inode;
        }

        while self.inode_to_path.contains_key(&self.next_inode) {
            self.next_inode += 1;
        }
        let inode = self.next_inode;
        self.next_inode += 1;

        self.path_to_inode.insert(normalized.clone(), inode);
        self.inode_to_path.insert(inode, normalized);
        inode
    }

    /// Get the inode for a path if it exists
    pub fn get_inode(&self, path: &str) -> Option<u64> {
        let normalized = Self::normalize_path(path);
        self.path_to_inode.get(&normalized).copied()
    }

    /// Get the path for an inode if it exists
    pub fn get_path(&self, inode: u64) -> Option<&str> {
        self.inode_to_path.get(&inode).map(String::as_str)
    }

    /// Resolve `name` inside the directory `parent` to an inode
    pub fn lookup(&self, parent: u64, name: &str) -> Option<u64> {
        let parent_path = self.get_path(parent)?;
        self.get_inode(&Self::join(parent_path, name))
    }

    /// Number of registered nodes, root included
    pub fn len(&self) -> usize {
        self.inode_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inode_to_path.is_empty()
    }

    /// Join a directory path and a child name
    pub fn join(parent: &str, name: &str) -> String {
        let parent = Self::normalize_path(parent);
        if parent == "/" {
            Self::normalize_path(name)
        } else {
            format!("{}/{}", parent, name.trim_matches('/'))
        }
    }

    /// Normalize a path to a consistent format
    fn normalize_path(path: &str) -> String {
        let path = path.trim();

        // Handle empty or root
        if path.is_empty() || path == "/" {
            return "/".to_string();
        }

        // Ensure leading slash, no trailing slash
        let mut normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        if normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }

        normalized
    }

    /// Get the parent path of a given path
    pub fn parent_path(path: &str) -> String {
        let normalized = Self::normalize_path(path);
        if normalized == "/" {
            return "/".to_string();
        }

        match normalized.rfind('/') {
            Some(0) => "/".to_string(),
            Some(pos) => normalized[..pos].to_string(),
            None => "/".to_string(),
        }
    }

    /// Get the filename component of a path
    pub fn filename(path: &str) -> &str {
        let normalized = path.trim();
        if normalized == "/" || normalized.is_empty() {
            return "";
        }

        match normalized.rfind('/') {
            Some(pos) => &normalized[pos + 1..],
            None => normalized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_inode() {
        let table = InodeTable::default();
        assert_eq!(table.get_inode("/"), Some(InodeTable::ROOT_INODE));
        assert_eq!(table.get_path(InodeTable::ROOT_INODE), Some("/"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_stable_inode() {
        let mut table = InodeTable::default();
        assert!(table.insert_stable("/file.txt", 2));
        assert_eq!(table.get_inode("file.txt"), Some(2));
        assert_eq!(table.lookup(InodeTable::ROOT_INODE, "file.txt"), Some(2));

        // Taken path, taken number, and the reserved zero are all refused
        assert!(!table.insert_stable("/file.txt", 9));
        assert!(!table.insert_stable("/other.txt", 2));
        assert!(!table.insert_stable("/other.txt", 0));
        assert!(!table.insert_stable("/other.txt", InodeTable::ROOT_INODE));
    }

    #[test]
    fn test_automatic_skips_stable() {
        let mut table = InodeTable::default();
        table.insert_stable("/file.txt", 2);

        let auto = table.get_or_create("/auto");
        assert_eq!(auto, 3);
        assert_eq!(table.get_or_create("/auto"), auto);
    }

    #[test]
    fn test_first_automatic_ino() {
        let mut table = InodeTable::new(100);
        table.insert_stable("/file.txt", 2);
        table.insert_stable("/pinned", 101);

        assert_eq!(table.get_or_create("/a"), 100);
        assert_eq!(table.get_or_create("/b"), 102);
    }

    #[test]
    fn test_lookup_missing() {
        let table = InodeTable::default();
        assert_eq!(table.lookup(InodeTable::ROOT_INODE, "nope"), None);
        assert_eq!(table.lookup(42, "file.txt"), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(InodeTable::normalize_path(""), "/");
        assert_eq!(InodeTable::normalize_path("/"), "/");
        assert_eq!(InodeTable::normalize_path("foo"), "/foo");
        assert_eq!(InodeTable::normalize_path("/foo/"), "/foo");
        assert_eq!(InodeTable::normalize_path("/foo/bar"), "/foo/bar");
    }

    #[test]
    fn test_join() {
        assert_eq!(InodeTable::join("/", "file.txt"), "/file.txt");
        assert_eq!(InodeTable::join("/dir/", "file.txt"), "/dir/file.txt");
    }

    #[test]
    fn test_parent_path_and_filename() {
        assert_eq!(InodeTable::parent_path("/"), "/");
        assert_eq!(InodeTable::parent_path("/file.txt"), "/");
        assert_eq!(InodeTable::parent_path("/dir/file.txt"), "/dir");
        assert_eq!(InodeTable::filename("/"), "");
        assert_eq!(InodeTable::filename("/dir/file.txt"), "file.txt");
    }
}
