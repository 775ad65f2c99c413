use std::path::{Path, PathBuf};

use crate::error::{PkglogError, Result};
use crate::package::PackageLog;

/// What happened to one directory entry during a scan.
#[derive(Debug)]
pub enum ScanOutcome {
    Loaded(PackageLog),
    /// The entry looked like a log but could not be parsed.
    Skipped { name: String, error: PkglogError },
    /// Not a regular file (or not a UTF-8 name); not a package.
    Ignored(PathBuf),
}

/// Iterator over the entries of a log directory, parsing one package per
/// step. Callers that need to stay responsive (a UI event pump, a progress
/// bar) can do their work between steps; `total()` gives the entry count
/// for progress fractions.
pub struct LogScan {
    log_dir: PathBuf,
    entries: std::vec::IntoIter<PathBuf>,
    total: usize,
}

impl LogScan {
    /// List `log_dir`. Failing to read the directory itself is an error;
    /// everything after that is reported per entry.
    pub fn new(log_dir: &Path) -> Result<Self> {
        let read_dir = std::fs::read_dir(log_dir)
            .map_err(|e| PkglogError::io(log_dir, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| PkglogError::io(log_dir, e))?;
            entries.push(entry.path());
        }

        let total = entries.len();
        Ok(Self {
            log_dir: log_dir.to_path_buf(),
            entries: entries.into_iter(),
            total,
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Number of directory entries, including ones that will be ignored.
    pub fn total(&self) -> usize {
        self.total
    }

    fn visit(&self, path: PathBuf) -> ScanOutcome {
        // Follows symlinks: a link to a regular log counts as a log.
        let is_regular = std::fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
        if !is_regular {
            return ScanOutcome::Ignored(path);
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => return ScanOutcome::Ignored(path),
        };

        match PackageLog::open(&self.log_dir, &name) {
            Ok(pkg) => ScanOutcome::Loaded(pkg),
            Err(error) => ScanOutcome::Skipped { name, error },
        }
    }
}

impl Iterator for LogScan {
    type Item = ScanOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.entries.next()?;
        Some(self.visit(path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}
