pub mod file;
pub mod log;
pub mod version;

pub use file::{FileRecord, FileSort, FileStatus, Inode};
pub use log::{PackageInfo, PackageLog};
