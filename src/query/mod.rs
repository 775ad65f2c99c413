//! Listing and report rendering for the command-line front end.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::database::PackageDatabase;
use crate::package::{PackageInfo, PackageLog};
use crate::util::format::{fmt_date, fmt_size};

/// Machine-readable view of one package for `list --json`.
#[derive(Debug, Serialize)]
pub struct PackageSummary<'a> {
    pub name: &'a str,
    pub base_name: &'a str,
    pub version: &'a str,
    pub date: i64,
    pub size: u64,
    pub files: usize,
    pub missing: usize,
    #[serde(flatten)]
    pub info: &'a PackageInfo,
}

impl<'a> From<&'a PackageLog> for PackageSummary<'a> {
    fn from(pkg: &'a PackageLog) -> Self {
        Self {
            name: pkg.name(),
            base_name: pkg.base_name(),
            version: pkg.version(),
            date: pkg.date(),
            size: pkg.size(),
            files: pkg.file_count(),
            missing: pkg.missing_count(),
            info: pkg.info(),
        }
    }
}

/// One row of the package listing: name, size, file count, date.
pub fn package_line(pkg: &PackageLog, name_width: usize) -> String {
    format!(
        "{:<name_width$}  {:>9}  {:>6}  {}",
        pkg.name(),
        fmt_size(pkg.size()),
        pkg.file_count(),
        fmt_date(pkg.date(), false),
    )
}

pub fn print_package_list(db: &PackageDatabase) {
    let width = db.packages().iter().map(|p| p.name().len()).max().unwrap_or(0);
    for pkg in db.packages() {
        println!("{}", package_line(pkg, width));
    }
    println!(
        "{:<width$}  {:>9}  {:>6}",
        "TOTAL",
        fmt_size(db.total_size()),
        db.total_files(),
    );
}

pub fn print_package_json(db: &PackageDatabase) -> Result<()> {
    let summaries: Vec<PackageSummary> = db.packages().iter().map(PackageSummary::from).collect();
    let json = serde_json::to_string_pretty(&summaries)
        .context("failed to serialize package list")?;
    println!("{}", json);
    Ok(())
}

/// The `info` report for one package.
pub fn info_block(pkg: &PackageLog) -> String {
    let info = pkg.info();
    let mut lines = vec![
        format!("Name        : {}", pkg.name()),
        format!("Base name   : {}", pkg.base_name()),
        format!("Version     : {}", pkg.version()),
        format!("Installed   : {}", fmt_date(pkg.date(), true)),
        format!("Size        : {}", fmt_size(pkg.size())),
        format!("Files       : {} ({} missing)", pkg.file_count(), pkg.missing_count()),
    ];
    let optional = [
        ("Summary     ", &info.summary),
        ("URL         ", &info.url),
        ("License     ", &info.license),
        ("Author      ", &info.author),
        ("Icon        ", &info.icon_path),
    ];
    for (label, value) in optional {
        if !value.is_empty() {
            lines.push(format!("{}: {}", label, value));
        }
    }
    lines.push(pkg.description_block());
    lines.join("\n")
}

/// Print every file with its size; missing files in red when `color`.
pub fn print_files(pkg: &PackageLog, color: bool) {
    for file in pkg.files() {
        let size = fmt_size(file.size());
        if file.is_missing() {
            if color {
                println!("{:>9}  {}", size.red(), file.path().red());
            } else {
                println!("{:>9}  {} (missing)", size, file.path());
            }
        } else {
            println!("{:>9}  {}", size, file.path());
        }
    }
}

pub fn print_owners(path: &str, owners: &[&PackageLog]) {
    if owners.is_empty() {
        println!("{} is not logged by any package", path);
        return;
    }
    for pkg in owners {
        println!("{}: {}", pkg.name(), path);
    }
}
