//! Fixed content of the mounted tree
//!
//! The tree is a root directory holding a single read-only file. Nothing
//! here changes after construction.

/// Name of the file exposed at the mount root
pub const FILE_NAME: &str = "file.txt";
/// Stable inode of the exposed file
pub const FILE_INODE: u64 = 2;
/// Permission bits of the exposed file (rw-r--r--)
pub const FILE_MODE: u16 = 0o644;
/// Permission bits reported for the root directory (rwxr-xr-x)
pub const ROOT_MODE: u16 = 0o755;

/// A regular file held entirely in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFileNode {
    pub name: String,
    pub data: Vec<u8>,
    pub mode: u16,
    /// `None` lets the inode table number the node
    pub ino: Option<u64>,
}

impl StaticFileNode {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Slice of the content starting at `offset`, at most `size` bytes long
    pub fn read_at(&self, offset: u64, size: u32) -> &[u8] {
        let len = self.data.len();
        let start = usize::try_from(offset).map_or(len, |offset| offset.min(len));
        let end = start.saturating_add(size as usize).min(len);
        &self.data[start..end]
    }
}

/// Root directory attributes plus the files it contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticContent {
    pub root_mode: u16,
    pub files: Vec<StaticFileNode>,
}

impl Default for StaticContent {
    fn default() -> Self {
        Self::hello()
    }
}

impl StaticContent {
    /// The demo tree: `file.txt` whose content is its own name
    pub fn hello() -> Self {
        Self {
            root_mode: ROOT_MODE,
            files: vec![StaticFileNode {
                name: FILE_NAME.to_string(),
                data: FILE_NAME.as_bytes().to_vec(),
                mode: FILE_MODE,
                ino: Some(FILE_INODE),
            }],
        }
    }

    /// Look a file up by name
    pub fn file(&self, name: &str) -> Option<&StaticFileNode> {
        self.files.iter().find(|file| file.name == name)
    }

    /// Name of the file the post-mount probe stats
    pub fn probe_name(&self) -> &str {
        self.files
            .first()
            .map(|file| file.name.as_str())
            .unwrap_or(FILE_NAME)
    }
}
