pub mod scan;

use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::{PkglogError, Result};
use crate::package::PackageLog;

pub use scan::{LogScan, ScanOutcome};

/// Sort order for the package list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageSort {
    /// Ascending name.
    #[default]
    Name,
    /// Largest first.
    Size,
    /// Most installed files first.
    Files,
    /// Most missing files first.
    MissingFiles,
    /// Most recently installed first.
    Date,
}

impl FromStr for PackageSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "name" => Ok(PackageSort::Name),
            "size" => Ok(PackageSort::Size),
            "files" => Ok(PackageSort::Files),
            "missing" => Ok(PackageSort::MissingFiles),
            "date" => Ok(PackageSort::Date),
            _ => Err(format!("invalid package sort mode: {}", s)),
        }
    }
}

/// Every package logged in one log directory.
///
/// `total_size()` is always the sum of the held packages' sizes. The type
/// is not `Clone`: the process entry point builds one and hands it out by
/// reference.
#[derive(Debug)]
pub struct PackageDatabase {
    log_dir: PathBuf,
    packages: Vec<PackageLog>,
    total_size: u64,
    warnings: Vec<String>,
}

impl PackageDatabase {
    /// A database with no packages, for logs added by hand.
    pub fn empty(log_dir: &Path) -> Self {
        Self {
            log_dir: log_dir.to_path_buf(),
            packages: Vec::new(),
            total_size: 0,
            warnings: Vec::new(),
        }
    }

    /// Scan `log_dir` and load every package in it. A log that fails to
    /// parse is skipped with a warning.
    pub fn open(log_dir: &Path) -> Result<Self> {
        Ok(Self::from_scan(LogScan::new(log_dir)?))
    }

    /// Drain a scan that the caller may already have partly driven.
    pub fn from_scan(scan: LogScan) -> Self {
        let mut db = Self::empty(scan.log_dir());
        db.packages.reserve(scan.total());
        for outcome in scan {
            db.absorb(outcome);
        }
        info!(
            "loaded {} packages from {} ({} skipped)",
            db.packages.len(),
            db.log_dir.display(),
            db.warnings.len()
        );
        db
    }

    /// Record one scan step.
    pub fn absorb(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Loaded(pkg) => self.add(pkg),
            ScanOutcome::Skipped { error, .. } => {
                warn!("{}", error);
                self.warnings.push(error.to_string());
            }
            ScanOutcome::Ignored(_) => {}
        }
    }

    pub fn add(&mut self, pkg: PackageLog) {
        self.total_size += pkg.size();
        self.packages.push(pkg);
    }

    /// Read `<log_dir>/<name>` and add it.
    pub fn load(&mut self, name: &str) -> Result<&PackageLog> {
        let pkg = PackageLog::open(&self.log_dir, name)?;
        self.add(pkg);
        Ok(&self.packages[self.packages.len() - 1])
    }

    /// Unregister a package: its log file is deleted first, and only once
    /// that succeeded is the package dropped from the database. A log file
    /// that is already gone is not an error.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let idx = self
            .packages
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| PkglogError::PackageNotFound(name.to_string()))?;

        self.packages[idx].unlog()?;

        let pkg = self.packages.remove(idx);
        self.total_size -= pkg.size();
        info!("removed {}", pkg.name());
        Ok(())
    }

    /// Every package whose file list contains exactly `path`.
    pub fn find_by_path(&mut self, path: &str) -> Vec<&PackageLog> {
        let hits: Vec<usize> = self
            .packages
            .iter_mut()
            .enumerate()
            .filter_map(|(i, pkg)| pkg.find_file(path).then_some(i))
            .collect();
        hits.into_iter().map(|i| &self.packages[i]).collect()
    }

    /// The package named exactly `query` if there is one, else every
    /// package whose base name is `query`.
    pub fn find_by_name(&self, query: &str) -> Vec<&PackageLog> {
        if let Some(pkg) = self.get(query) {
            return vec![pkg];
        }
        self.packages
            .iter()
            .filter(|p| p.base_name() == query)
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&PackageLog> {
        self.packages.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PackageLog> {
        self.packages.iter_mut().find(|p| p.name() == name)
    }

    /// Stable sort of the package list; `reverse` flips the result.
    pub fn sort(&mut self, mode: PackageSort, reverse: bool) {
        match mode {
            PackageSort::Name => self.packages.sort_by(|a, b| a.name().cmp(b.name())),
            PackageSort::Size => self.packages.sort_by_key(|p| Reverse(p.size())),
            PackageSort::Files => self.packages.sort_by_key(|p| Reverse(p.file_count())),
            PackageSort::MissingFiles => {
                self.packages.sort_by_key(|p| Reverse(p.missing_count()))
            }
            PackageSort::Date => self.packages.sort_by_key(|p| Reverse(p.date())),
        }
        if reverse {
            self.packages.reverse();
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn packages(&self) -> &[PackageLog] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn total_files(&self) -> usize {
        self.packages.iter().map(|p| p.file_count()).sum()
    }

    /// One message per log skipped while scanning.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
