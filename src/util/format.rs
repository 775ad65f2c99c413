//! Human-readable rendering of sizes and dates for listings.

use chrono::{Local, TimeZone};

pub const KILOBYTE: u64 = 1024;
pub const MEGABYTE: u64 = 1024 * KILOBYTE;
pub const GIGABYTE: u64 = 1024 * MEGABYTE;

/// Format a byte count: plain bytes below 1 KB, whole KB below 1 MB,
/// one decimal for MB and GB.
pub fn fmt_size(size: u64) -> String {
    if size < KILOBYTE {
        format!("{}", size)
    } else if size < MEGABYTE {
        format!("{:.0} KB", size as f64 / KILOBYTE as f64)
    } else if size < GIGABYTE {
        format!("{:.1} MB", size as f64 / MEGABYTE as f64)
    } else {
        format!("{:.1} GB", size as f64 / GIGABYTE as f64)
    }
}

/// Format epoch seconds in local time as `dd-mm-yyyy`, with ` HH:MM` when
/// `print_hour` is set. Out-of-range timestamps render as `-`.
pub fn fmt_date(date: i64, print_hour: bool) -> String {
    let fmt = if print_hour { "%d-%m-%Y %H:%M" } else { "%d-%m-%Y" };
    match Local.timestamp_opt(date, 0).single() {
        Some(dt) => dt.format(fmt).to_string(),
        None => "-".to_string(),
    }
}

/// Remove every trailing `c` from `s`.
pub fn strip_trailing(s: &str, c: char) -> &str {
    s.trim_end_matches(c)
}
