//! Per-package install logs.
//!
//! Each package built and installed on the system has one log file in the
//! log directory, named after the package, holding its metadata and the
//! list of files the build installed. [`database::PackageDatabase`] loads
//! the whole directory; [`package::PackageLog`] reads, writes and queries
//! one log.

pub mod config;
pub mod database;
pub mod error;
pub mod package;
pub mod query;
pub mod util;

pub use database::PackageDatabase;
pub use error::{PkglogError, Result};
pub use package::{FileRecord, PackageLog};
