use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PkglogError, Result};
use crate::package::file::{FileRecord, FileSort, FileStatus, Inode};
use crate::package::version;
use crate::util::format::strip_trailing;

/// First bytes of every log file.
pub const LOG_MARKER: &str = "#!porg";

/// Format version written by `write_log`. Version 0 is the legacy layout
/// whose path lines may carry a `|`-delimited suffix.
pub const LOG_FORMAT_VERSION: u32 = 1;

/// Byte offset of the format-version digit within the marker line
/// (`#!porg-<digit>`).
const VERSION_OFFSET: usize = LOG_MARKER.len() + 1;

pub const CODE_DATE: u8 = b't';
pub const CODE_AUTHOR: u8 = b'a';
pub const CODE_SUMMARY: u8 = b's';
pub const CODE_URL: u8 = b'u';
pub const CODE_LICENSE: u8 = b'l';
pub const CODE_CONF_OPTS: u8 = b'c';
pub const CODE_ICON_PATH: u8 = b'i';
pub const CODE_DESCRIPTION: u8 = b'd';

/// Free-text metadata recorded in a log header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub summary: String,
    /// Newline-separated; each line is one `#d:` header line on disk.
    pub description: String,
    pub url: String,
    pub license: String,
    pub author: String,
    pub conf_opts: String,
    pub icon_path: String,
}

/// The install log of one package: header metadata plus every file the
/// build touched.
///
/// `file_count + missing_count == files().len()` always holds, and `size`
/// counts each distinct inode among the installed files once.
#[derive(Debug)]
pub struct PackageLog {
    name: String,
    base_name: String,
    version: String,
    log_path: PathBuf,
    date: i64,
    size: u64,
    file_count: usize,
    missing_count: usize,
    info: PackageInfo,
    files: Vec<FileRecord>,
    inodes: HashSet<Inode>,
    sorted_by_name: bool,
}

impl PackageLog {
    /// An empty log for `name`, backed by `<log_dir>/<name>`. Nothing is
    /// read or written; the install date is now.
    pub fn new(log_dir: &Path, name: &str) -> Self {
        let (base_name, version) = version::split_name(name);
        Self {
            name: name.to_string(),
            base_name: base_name.to_string(),
            version: version.to_string(),
            log_path: log_dir.join(name),
            date: chrono::Utc::now().timestamp(),
            size: 0,
            file_count: 0,
            missing_count: 0,
            info: PackageInfo::default(),
            files: Vec::new(),
            inodes: HashSet::new(),
            sorted_by_name: false,
        }
    }

    /// Construct and parse `<log_dir>/<name>`.
    pub fn open(log_dir: &Path, name: &str) -> Result<Self> {
        let mut pkg = Self::new(log_dir, name);
        pkg.read_log()?;
        Ok(pkg)
    }

    /// Populate this package from its log file.
    ///
    /// Only a missing marker line is fatal. Short or unknown header lines and
    /// unparsable values are dropped.
    pub fn read_log(&mut self) -> Result<()> {
        let file = File::open(&self.log_path)
            .map_err(|e| PkglogError::io(&self.log_path, e))?;
        self.parse(BufReader::new(file))?;
        debug!(
            "read {}: {} files ({} missing), {} bytes",
            self.name, self.file_count, self.missing_count, self.size
        );
        Ok(())
    }

    fn parse<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let log_path = self.log_path.clone();
        // One line per call, without its '\n'. Bytes are returned as-is;
        // only a failing read is an error.
        let mut next_line = || -> Result<Option<Vec<u8>>> {
            let mut buf = Vec::new();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| PkglogError::io(&log_path, e))?;
            if n == 0 {
                return Ok(None);
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            Ok(Some(buf))
        };

        let db_version = match next_line()? {
            Some(first) if first.starts_with(LOG_MARKER.as_bytes()) => format_version(&first),
            _ => {
                return Err(PkglogError::FormatError {
                    path: self.log_path.clone(),
                });
            }
        };

        // Header: '#<code>:<value>' lines up to the first line not starting
        // with '#'.
        let mut seen_description = false;
        let mut line = next_line()?;
        while let Some(buf) = line.as_deref() {
            if !buf.starts_with(b"#") {
                break;
            }
            self.parse_header_line(buf, &mut seen_description);
            line = next_line()?;
        }

        let mut paths = Vec::new();
        while let Some(mut buf) = line {
            if !buf.starts_with(b"/") {
                break;
            }
            if db_version == 0 {
                if let Some(p) = buf.iter().position(|&b| b == b'|') {
                    buf.truncate(p);
                }
            }
            match String::from_utf8(buf) {
                Ok(path) => paths.push(path),
                Err(e) => warn!(
                    "{}: skipping non-UTF-8 path {}",
                    self.log_path.display(),
                    String::from_utf8_lossy(e.as_bytes())
                ),
            }
            line = next_line()?;
        }

        for path in paths {
            self.add_file(path);
        }

        self.sort_files(FileSort::Name, false);
        Ok(())
    }

    fn parse_header_line(&mut self, buf: &[u8], seen_description: &mut bool) {
        if buf.len() < 3 {
            return;
        }
        let val = String::from_utf8_lossy(&buf[3..]);
        let field = match buf[1] {
            CODE_DATE => {
                if let Some(date) = leading_int(&val) {
                    self.date = date;
                }
                return;
            }
            CODE_CONF_OPTS => &mut self.info.conf_opts,
            CODE_ICON_PATH => &mut self.info.icon_path,
            CODE_SUMMARY => &mut self.info.summary,
            CODE_URL => &mut self.info.url,
            CODE_LICENSE => &mut self.info.license,
            CODE_AUTHOR => &mut self.info.author,
            CODE_DESCRIPTION => {
                if *seen_description {
                    self.info.description.push('\n');
                }
                *seen_description = true;
                self.info.description.push_str(&val);
                return;
            }
            _ => return,
        };
        *field = val.into_owned();
    }

    /// Write the log file, replacing any previous content.
    pub fn write_log(&self) -> Result<()> {
        let file = File::create(&self.log_path)
            .map_err(|e| PkglogError::io(&self.log_path, e))?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out)
            .and_then(|_| out.flush())
            .map_err(|e| PkglogError::io(&self.log_path, e))?;
        debug!("wrote {} ({} files)", self.log_path.display(), self.files.len());
        Ok(())
    }

    fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let info = &self.info;
        writeln!(out, "{}-{}", LOG_MARKER, LOG_FORMAT_VERSION)?;
        writeln!(out, "#{}:{}", CODE_DATE as char, self.date)?;
        writeln!(out, "#{}:{}", CODE_AUTHOR as char, info.author)?;
        writeln!(out, "#{}:{}", CODE_SUMMARY as char, strip_trailing(&info.summary, '.'))?;
        writeln!(out, "#{}:{}", CODE_URL as char, info.url)?;
        writeln!(out, "#{}:{}", CODE_LICENSE as char, info.license)?;
        writeln!(out, "#{}:{}", CODE_CONF_OPTS as char, info.conf_opts)?;
        writeln!(out, "#{}:{}", CODE_ICON_PATH as char, info.icon_path)?;

        let code = CODE_DESCRIPTION as char;
        if info.description.is_empty() {
            writeln!(out, "#{}:", code)?;
        } else {
            for segment in info.description.split_terminator('\n') {
                writeln!(out, "#{}:{}", code, segment)?;
            }
        }

        for file in &self.files {
            writeln!(out, "{}", file.path())?;
        }
        Ok(())
    }

    /// Append `path` to the file list and account for it.
    ///
    /// An installed path counts towards `file_count`; its size is added to
    /// the package size only the first time its inode is seen, so hardlinks
    /// count once. A missing path only bumps `missing_count`.
    pub fn add_file(&mut self, path: impl Into<String>) {
        let file = FileRecord::new(path);
        match file.status() {
            FileStatus::Installed { size, inode } => {
                self.file_count += 1;
                if self.inodes.insert(inode) {
                    self.size += size;
                }
            }
            FileStatus::Missing => self.missing_count += 1,
        }
        self.files.push(file);
        self.sorted_by_name = false;
    }

    /// Whether `path` is in the file list. Re-sorts by name first unless the
    /// list is already in ascending name order.
    pub fn find_file(&mut self, path: &str) -> bool {
        if !self.sorted_by_name {
            self.sort_files(FileSort::Name, false);
        }
        self.files.binary_search(&FileRecord::probe(path)).is_ok()
    }

    pub fn sort_files(&mut self, mode: FileSort, reverse: bool) {
        mode.apply(&mut self.files);
        if reverse {
            self.files.reverse();
        }
        self.sorted_by_name = mode == FileSort::Name && !reverse;
    }

    /// Delete the backing log file. A file that is already gone is not an
    /// error. The in-memory package is left untouched.
    pub fn unlog(&self) -> Result<()> {
        match std::fs::remove_file(&self.log_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PkglogError::io(&self.log_path, e)),
        }
    }

    /// `"Description: ..."` for display. A multi-line description puts
    /// each line on its own line, indented by three spaces.
    pub fn description_block(&self) -> String {
        let mut desc = String::from("Description: ");
        let text = &self.info.description;
        if !text.contains('\n') {
            desc.push_str(text);
        } else {
            for line in text.split_terminator('\n') {
                desc.push_str("\n   ");
                desc.push_str(line);
            }
        }
        desc
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Install date, in seconds since the epoch.
    pub fn date(&self) -> i64 {
        self.date
    }

    pub fn set_date(&mut self, date: i64) {
        self.date = date;
    }

    /// Installed size in bytes, hardlinks counted once.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of logged files currently installed.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn missing_count(&self) -> usize {
        self.missing_count
    }

    pub fn info(&self) -> &PackageInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut PackageInfo {
        &mut self.info
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }
}

/// The digit following `#!porg-`, or 0 when there is none.
fn format_version(marker_line: &[u8]) -> u32 {
    marker_line
        .get(VERSION_OFFSET)
        .and_then(|b| (*b as char).to_digit(10))
        .unwrap_or(0)
}

/// The integer at the start of `s` after leading whitespace, ignoring
/// whatever follows it (`"1700000000x"` gives 1700000000).
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}
