use std::path::Path;

use pkglog::package::{FileSort, PackageLog};
use pkglog::PkglogError;

fn installed(root: &Path, name: &str, len: usize) -> String {
    let path = root.join(name);
    std::fs::write(&path, vec![b'x'; len]).unwrap();
    path.to_str().unwrap().to_string()
}

fn paths(pkg: &PackageLog) -> Vec<String> {
    pkg.files().iter().map(|f| f.path().to_string()).collect()
}

#[test]
fn test_write_then_read_round_trip() {
    let logs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let bin = installed(root.path(), "hello", 64);
    let doc = installed(root.path(), "README", 16);

    let mut pkg = PackageLog::new(logs.path(), "hello-2.12");
    pkg.set_date(1_700_000_000);
    {
        let info = pkg.info_mut();
        info.summary = "GNU Hello".to_string();
        info.description = "Prints a greeting.\nAlso a demo.".to_string();
        info.url = "https://www.gnu.org/software/hello/".to_string();
        info.license = "GPL-3.0".to_string();
        info.author = "GNU".to_string();
        info.conf_opts = "--prefix=/usr --disable-nls".to_string();
        info.icon_path = "/usr/share/pixmaps/hello.png".to_string();
    }
    pkg.add_file(bin.clone());
    pkg.add_file(doc.clone());
    pkg.add_file("/nonexistent/hello/man1/hello.1");
    pkg.write_log().unwrap();

    let reread = PackageLog::open(logs.path(), "hello-2.12").unwrap();
    assert_eq!(reread.info(), pkg.info());
    assert_eq!(reread.date(), 1_700_000_000);
    assert_eq!(reread.size(), 80);
    assert_eq!(reread.file_count(), 2);
    assert_eq!(reread.missing_count(), 1);

    let mut expected = paths(&pkg);
    expected.sort();
    assert_eq!(paths(&reread), expected);
}

#[test]
fn test_legacy_log_normalizes_on_rewrite() {
    let logs = tempfile::tempdir().unwrap();
    std::fs::write(
        logs.path().join("old-0.9"),
        "#!porg-0.2\n#t:1000\n#s:Old thing\n#d:\n/usr/bin/old|100\n/usr/lib/libold.so|200\n",
    )
    .unwrap();

    let old = PackageLog::open(logs.path(), "old-0.9").unwrap();
    assert_eq!(paths(&old), vec!["/usr/bin/old", "/usr/lib/libold.so"]);
    old.write_log().unwrap();

    let text = std::fs::read_to_string(logs.path().join("old-0.9")).unwrap();
    assert!(text.starts_with("#!porg-1\n"));
    assert!(!text.contains('|'));

    let reread = PackageLog::open(logs.path(), "old-0.9").unwrap();
    assert_eq!(reread.info(), old.info());
    assert_eq!(paths(&reread), paths(&old));
}

#[test]
fn test_hardlinks_counted_once() {
    let logs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let first = installed(root.path(), "first", 1000);
    let second = root.path().join("second");
    std::fs::hard_link(&first, &second).unwrap();
    let other = installed(root.path(), "other", 24);

    let mut pkg = PackageLog::new(logs.path(), "links-1.0");
    pkg.add_file(first);
    pkg.add_file(second.to_str().unwrap());
    assert_eq!(pkg.size(), 1000);
    assert_eq!(pkg.file_count(), 2);

    pkg.add_file(other);
    assert_eq!(pkg.size(), 1024);
    assert_eq!(pkg.file_count(), 3);
}

#[test]
fn test_missing_file_accounting() {
    let logs = tempfile::tempdir().unwrap();
    let mut pkg = PackageLog::new(logs.path(), "gone-1.0");
    pkg.add_file("/nonexistent/pkglog/gone");
    assert_eq!(pkg.missing_count(), 1);
    assert_eq!(pkg.file_count(), 0);
    assert_eq!(pkg.size(), 0);
    assert_eq!(pkg.file_count() + pkg.missing_count(), pkg.files().len());
}

#[test]
fn test_sort_by_size_and_find() {
    let logs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let small = installed(root.path(), "a_small", 1);
    let large = installed(root.path(), "b_large", 300);
    let medium = installed(root.path(), "c_medium", 20);

    let mut pkg = PackageLog::new(logs.path(), "mix-1.0");
    for path in [&small, &large, &medium] {
        pkg.add_file(path.as_str());
    }

    pkg.sort_files(FileSort::Size, false);
    assert_eq!(paths(&pkg), vec![large.clone(), medium.clone(), small.clone()]);

    pkg.sort_files(FileSort::Size, true);
    assert_eq!(paths(&pkg), vec![small.clone(), medium.clone(), large.clone()]);

    assert!(pkg.find_file(&medium));
    assert!(!pkg.find_file("/nonexistent/pkglog/nothing"));

    pkg.sort_files(FileSort::Name, false);
    assert_eq!(paths(&pkg), vec![small.clone(), large.clone(), medium.clone()]);
    assert!(pkg.find_file(&small));
    assert!(pkg.find_file(&large));
}

#[test]
fn test_write_into_missing_dir_fails() {
    let pkg = PackageLog::new(Path::new("/nonexistent/pkglog/logs"), "foo-1.0");
    match pkg.write_log() {
        Err(PkglogError::IoError { path, .. }) => {
            assert_eq!(path, Path::new("/nonexistent/pkglog/logs/foo-1.0"));
        }
        other => panic!("expected IoError, got {:?}", other),
    }
}

#[test]
fn test_open_missing_log_is_io_error() {
    let logs = tempfile::tempdir().unwrap();
    let result = PackageLog::open(logs.path(), "absent-1.0");
    assert!(matches!(result, Err(PkglogError::IoError { .. })));
}

#[test]
fn test_unlog_twice() {
    let logs = tempfile::tempdir().unwrap();
    let pkg = PackageLog::new(logs.path(), "tmp-1.0");
    pkg.write_log().unwrap();
    assert!(pkg.log_path().exists());

    pkg.unlog().unwrap();
    assert!(!pkg.log_path().exists());
    pkg.unlog().unwrap();
}
