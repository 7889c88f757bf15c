//! File-backed tests for line and TSV reading through `FileUtil`.

use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tabfile::errors::FileUtilError;
use tabfile::{FileUtil, MapListOptions};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_empty_file_reads_as_no_lines() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "empty.txt", "");
    let lines = FileUtil::new().read_lines_from_file(&path).unwrap();
    assert!(lines.is_empty());
}

#[test]
fn test_map_strict_mode_names_offending_line() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "pairs.tsv",
        indoc! {"
            alpha\t1
            beta\t2\t3
            gamma\t4
        "},
    );

    let err = FileUtil::new()
        .read_map_from_tsv_file(&path, false)
        .unwrap_err();
    match err {
        FileUtilError::Format {
            ref line,
            line_number,
            ..
        } => {
            assert_eq!(line, "beta\t2\t3");
            assert_eq!(line_number, 2);
        }
        ref other => panic!("expected format error, got {other:?}"),
    }
    assert!(err.to_string().contains("beta"));
}

#[test]
fn test_map_skip_mode_keeps_well_formed_lines() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "pairs.tsv", "alpha\t1\nbeta\t2\t3\ngamma\t4\n");

    let map = FileUtil::new().read_map_from_tsv_file(&path, true).unwrap();
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("alpha".to_string(), "1".to_string()),
            ("gamma".to_string(), "4".to_string())
        ]
    );
}

#[test]
fn test_map_list_key_index_and_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "rows.tsv", "a\tx\ty\na\tz\n");
    let util = FileUtil::new();

    let accumulated = util
        .read_map_list_from_tsv_file(&path, &MapListOptions::default())
        .unwrap();
    assert_eq!(accumulated["a"], vec!["x", "y", "z"]);

    let overwritten = util
        .read_map_list_from_tsv_file(&path, &MapListOptions::new().overwrite(true))
        .unwrap();
    assert_eq!(overwritten["a"], vec!["z"]);

    let reversed = write(&dir, "reversed.tsv", "x\ta\n");
    let by_second = util
        .read_map_list_from_tsv_file(&reversed, &MapListOptions::new().key_index(1))
        .unwrap();
    assert_eq!(by_second["a"], vec!["x"]);
}

#[test]
fn test_write_lines_then_read_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");
    let util = FileUtil::new();

    util.write_lines_to_file(&path, &["first", "", "third"]).unwrap();
    util.append_lines_to_file(&path, &["fourth"]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "first\n\nthird\nfourth\n");
    assert_eq!(
        util.read_lines_from_file(&path).unwrap(),
        vec!["first", "", "third", "fourth"]
    );
}

#[test]
fn test_list_directory_contents_on_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "plain.txt", "x");
    write(&dir, "b.txt", "");
    write(&dir, "a.txt", "");
    let util = FileUtil::new();

    assert!(util.list_directory_contents(&file).unwrap().is_empty());
    assert_eq!(
        util.list_directory_contents(dir.path()).unwrap(),
        vec!["a.txt", "b.txt", "plain.txt"]
    );
}

#[test]
fn test_mkdirs_is_idempotent_and_mkdir_or_die_checked_refuses_existing() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let util = FileUtil::new();

    util.mkdirs(&nested).unwrap();
    util.mkdirs(&nested).unwrap();
    assert!(nested.is_dir());

    let target = dir.path().join("fresh");
    let target = target.to_str().unwrap();
    util.mkdir_or_die_checked(target).unwrap();
    assert!(Path::new(target).is_dir());
    assert!(matches!(
        util.mkdir_or_die_checked(target),
        Err(FileUtilError::AlreadyExists { .. })
    ));
}

#[test]
fn test_copy_touch_delete_round() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.bin", "bytes\twith\ttabs");
    let dst = dir.path().join("dst.bin");
    let util = FileUtil::new();

    assert_eq!(util.copy(&src, &dst).unwrap(), 15);
    assert_eq!(fs::read(&dst).unwrap(), fs::read(&src).unwrap());
    assert!(util.copy(&src, &dst).is_err());

    let marker = dir.path().join("marker");
    util.touch_file(&marker).unwrap();
    assert!(util.file_exists(&marker));

    util.delete_file(&marker).unwrap();
    assert!(!util.file_exists(&marker));
    assert!(util.delete_file(&marker).is_err());
}

#[test]
fn test_read_double_list_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "scores.txt", "0.25\n-1\n1e3\n");
    assert_eq!(
        FileUtil::new().read_double_list_from_file(&path).unwrap(),
        vec![0.25, -1.0, 1000.0]
    );

    let bad = write(&dir, "bad.txt", "1\ntwo\n");
    let err = FileUtil::new().read_double_list_from_file(&bad).unwrap_err();
    assert_eq!(err.category(), "Parse");
    assert_eq!(err.line(), Some("two"));
}
