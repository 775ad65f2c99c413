use std::path::Path;

use pkglog::database::{LogScan, PackageDatabase, ScanOutcome};
use pkglog::package::PackageLog;

fn installed(root: &Path, name: &str, len: usize) -> String {
    let path = root.join(name);
    std::fs::write(&path, vec![b'x'; len]).unwrap();
    path.to_str().unwrap().to_string()
}

fn log_package(logs: &Path, name: &str, files: &[&str]) {
    let mut pkg = PackageLog::new(logs, name);
    for file in files {
        pkg.add_file(*file);
    }
    pkg.write_log().unwrap();
}

fn sum_of_packages(db: &PackageDatabase) -> u64 {
    db.packages().iter().map(|p| p.size()).sum()
}

#[test]
fn test_scan_skips_corrupt_log() {
    let logs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let bin = installed(root.path(), "tool", 512);
    log_package(logs.path(), "tool-1.0", &[bin.as_str()]);
    std::fs::write(logs.path().join("broken-1.0"), "/usr/bin/broken\n").unwrap();

    let db = PackageDatabase::open(logs.path()).unwrap();
    assert_eq!(db.len(), 1);
    assert_eq!(db.packages()[0].name(), "tool-1.0");
    assert_eq!(db.warnings().len(), 1);
    assert!(db.warnings()[0].contains("broken-1.0"));
    assert_eq!(db.total_size(), 512);
}

#[test]
fn test_total_tracks_add_and_remove() {
    let logs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let a = installed(root.path(), "a", 100);
    let b = installed(root.path(), "b", 200);
    let c = installed(root.path(), "c", 300);
    log_package(logs.path(), "a-1", &[a.as_str()]);
    log_package(logs.path(), "b-1", &[b.as_str()]);

    let mut db = PackageDatabase::open(logs.path()).unwrap();
    assert_eq!(db.total_size(), 300);
    assert_eq!(db.total_size(), sum_of_packages(&db));

    log_package(logs.path(), "c-1", &[c.as_str()]);
    db.load("c-1").unwrap();
    assert_eq!(db.total_size(), 600);
    assert_eq!(db.total_size(), sum_of_packages(&db));

    db.remove("a-1").unwrap();
    assert_eq!(db.total_size(), 500);
    assert_eq!(db.total_size(), sum_of_packages(&db));

    db.remove("c-1").unwrap();
    db.remove("b-1").unwrap();
    assert!(db.is_empty());
    assert_eq!(db.total_size(), 0);
}

#[test]
fn test_remove_after_external_delete() {
    let logs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let a = installed(root.path(), "a", 42);
    log_package(logs.path(), "a-1", &[a.as_str()]);

    let mut db = PackageDatabase::open(logs.path()).unwrap();
    std::fs::remove_file(logs.path().join("a-1")).unwrap();

    db.remove("a-1").unwrap();
    assert!(db.is_empty());
    assert_eq!(db.total_size(), 0);
}

#[test]
fn test_find_by_path_reports_every_owner() {
    let logs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let shared = installed(root.path(), "shared", 10);
    let only = installed(root.path(), "only", 10);
    log_package(logs.path(), "one-1.0", &[shared.as_str(), only.as_str()]);
    log_package(logs.path(), "two-1.0", &[shared.as_str()]);
    log_package(logs.path(), "three-1.0", &[]);

    let mut db = PackageDatabase::open(logs.path()).unwrap();

    let mut owners: Vec<_> = db.find_by_path(&shared).iter().map(|p| p.name().to_string()).collect();
    owners.sort();
    assert_eq!(owners, vec!["one-1.0", "two-1.0"]);

    let owners: Vec<_> = db.find_by_path(&only).iter().map(|p| p.name().to_string()).collect();
    assert_eq!(owners, vec!["one-1.0"]);

    assert!(db.find_by_path("/nonexistent/pkglog/none").is_empty());
}

#[test]
fn test_incremental_scan() {
    let logs = tempfile::tempdir().unwrap();
    log_package(logs.path(), "a-1", &[]);
    log_package(logs.path(), "b-1", &[]);
    std::fs::write(logs.path().join("junk"), "").unwrap();

    let scan = LogScan::new(logs.path()).unwrap();
    let total = scan.total();
    assert_eq!(total, 3);

    let mut db = PackageDatabase::empty(logs.path());
    let mut steps = 0;
    for outcome in scan {
        if let ScanOutcome::Skipped { name, .. } = &outcome {
            assert_eq!(name, "junk");
        }
        db.absorb(outcome);
        steps += 1;
    }
    assert_eq!(steps, total);
    assert_eq!(db.len(), 2);
    assert_eq!(db.warnings().len(), 1);
}
