use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::os::unix::fs::MetadataExt;
use std::str::FromStr;

/// Device and inode number of an installed file.
///
/// Only compared for equality (hardlink detection); never used to reach
/// the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inode {
    pub dev: u64,
    pub ino: u64,
}

/// Live state of a logged path, as seen by a single `lstat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Installed { size: u64, inode: Inode },
    Missing,
}

/// One path recorded in a package log.
///
/// Nothing about the filesystem is stored: every accessor below re-stats
/// the path, so the answer is never older than the call that produced it.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Throwaway record used as a search key.
    pub fn probe(path: &str) -> Self {
        Self::new(path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Symlinks are not followed. Any stat failure, not only `NotFound`,
    /// reports the file as missing.
    pub fn status(&self) -> FileStatus {
        match std::fs::symlink_metadata(&self.path) {
            Ok(meta) => FileStatus::Installed {
                size: meta.len(),
                inode: Inode { dev: meta.dev(), ino: meta.ino() },
            },
            Err(_) => FileStatus::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.status(), FileStatus::Missing)
    }

    pub fn is_installed(&self) -> bool {
        !self.is_missing()
    }

    /// Byte size, 0 when missing.
    pub fn size(&self) -> u64 {
        match self.status() {
            FileStatus::Installed { size, .. } => size,
            FileStatus::Missing => 0,
        }
    }

    pub fn inode(&self) -> Option<Inode> {
        match self.status() {
            FileStatus::Installed { inode, .. } => Some(inode),
            FileStatus::Missing => None,
        }
    }
}

impl PartialEq for FileRecord {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileRecord {}

impl Ord for FileRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl PartialOrd for FileRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Sort order for a package's file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSort {
    /// Ascending path.
    #[default]
    Name,
    /// Descending byte count, largest first.
    Size,
}

impl FileSort {
    /// Sort `files` in this order. Both orders are stable.
    pub fn apply(self, files: &mut [FileRecord]) {
        match self {
            FileSort::Name => files.sort_by(|a, b| a.path.cmp(&b.path)),
            // One stat per file per sort rather than per comparison.
            FileSort::Size => files.sort_by_cached_key(|f| Reverse(f.size())),
        }
    }
}

impl FromStr for FileSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "name" => Ok(FileSort::Name),
            "size" => Ok(FileSort::Size),
            _ => Err(format!("invalid file sort mode: {}", s)),
        }
    }
}
