use std::fs;

use tempfile::TempDir;

use super::*;
use crate::bencode::{decode, Value};

fn tree() -> Value {
    decode(b"d4:infod5:filesl4:spami42eee4:name4:demoe").unwrap()
}

#[test]
fn test_select_root() {
    let root = tree();
    let selected = Selector::parse("").select(&root).unwrap();
    assert_eq!(selected, &root);
}

#[test]
fn test_select_nested() {
    let root = tree();
    assert_eq!(
        Selector::parse("name").select(&root).unwrap().as_str(),
        Some("demo")
    );
    assert_eq!(
        Selector::parse("info files 1").select(&root).unwrap(),
        &Value::Integer(42)
    );
    assert_eq!(
        Selector::parse("info files first").select(&root).unwrap().as_str(),
        Some("spam")
    );
    assert_eq!(
        Selector::parse("info files last").select(&root).unwrap(),
        &Value::Integer(42)
    );
}

#[test]
fn test_select_splits_on_whitespace_runs() {
    let root = tree();
    assert_eq!(
        Selector::parse(" info\t\nfiles \x0c 0 ").select(&root).unwrap().as_str(),
        Some("spam")
    );
}

#[test]
fn test_select_miss_reports_step() {
    let root = tree();

    match Selector::parse("info missing").select(&root).unwrap_err() {
        EditError::KeyNotFound { step, key } => {
            assert_eq!(step, 2);
            assert_eq!(key, "missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    match Selector::parse("name x").select(&root).unwrap_err() {
        EditError::NotAContainer { step, kind } => {
            assert_eq!(step, 2);
            assert_eq!(kind, "string");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_select_list_misses() {
    let root = tree();

    assert!(matches!(
        Selector::parse("info files 2").select(&root).unwrap_err(),
        EditError::IndexOutOfRange { step: 3, index: 2, len: 2 }
    ));
    assert!(matches!(
        Selector::parse("info files -1").select(&root).unwrap_err(),
        EditError::IndexOutOfRange { step: 3, index: -1, .. }
    ));
    assert!(matches!(
        Selector::parse("info files spam").select(&root).unwrap_err(),
        EditError::NotAListIndex { step: 3, .. }
    ));

    let empty = decode(b"d5:fileslee").unwrap();
    assert!(matches!(
        Selector::parse("files first").select(&empty).unwrap_err(),
        EditError::IndexOutOfRange { step: 2, .. }
    ));
    assert!(matches!(
        Selector::parse("files last").select(&empty).unwrap_err(),
        EditError::IndexOutOfRange { step: 2, .. }
    ));
}

#[test]
fn test_set_dict_creates_and_replaces() {
    let mut root = tree();

    Selector::parse("name").set(&mut root, Value::string("other")).unwrap();
    assert_eq!(root.get(b"name").and_then(Value::as_str), Some("other"));

    Selector::parse("comment").set(&mut root, Value::string("new")).unwrap();
    assert_eq!(root.get(b"comment").and_then(Value::as_str), Some("new"));
}

#[test]
fn test_set_list_positions() {
    let mut root = tree();

    Selector::parse("info files first").set(&mut root, Value::Integer(1)).unwrap();
    Selector::parse("info files last").set(&mut root, Value::Integer(2)).unwrap();
    Selector::parse("info files 1").set(&mut root, Value::Integer(3)).unwrap();
    assert_eq!(
        Selector::parse("info files").select(&root).unwrap(),
        &Value::List(vec![Value::Integer(1), Value::Integer(3)])
    );

    // first and last append to an empty list.
    let mut empty = decode(b"d5:fileslee").unwrap();
    Selector::parse("files first").set(&mut empty, Value::Integer(7)).unwrap();
    assert_eq!(
        Selector::parse("files").select(&empty).unwrap(),
        &Value::List(vec![Value::Integer(7)])
    );

    let mut empty = decode(b"d5:fileslee").unwrap();
    Selector::parse("files last").set(&mut empty, Value::Integer(8)).unwrap();
    assert_eq!(
        Selector::parse("files").select(&empty).unwrap(),
        &Value::List(vec![Value::Integer(8)])
    );
}

#[test]
fn test_set_list_hard_failures() {
    let mut root = tree();

    assert!(matches!(
        Selector::parse("info files 2").set(&mut root, Value::Integer(0)).unwrap_err(),
        EditError::IndexOutOfRange { step: 3, index: 2, .. }
    ));
    assert!(matches!(
        Selector::parse("info files -1").set(&mut root, Value::Integer(0)).unwrap_err(),
        EditError::IndexOutOfRange { step: 3, index: -1, .. }
    ));
    assert!(matches!(
        Selector::parse("info files spam").set(&mut root, Value::Integer(0)).unwrap_err(),
        EditError::NotAListIndex { step: 3, .. }
    ));
}

#[test]
fn test_set_scalar_target_fails() {
    let mut root = tree();
    assert!(matches!(
        Selector::parse("name sub").set(&mut root, Value::Integer(0)).unwrap_err(),
        EditError::NotAContainer { step: 2, kind: "string" }
    ));
}

#[test]
fn test_set_intermediate_miss_fails() {
    let mut root = tree();
    assert!(matches!(
        Selector::parse("missing key").set(&mut root, Value::Integer(0)).unwrap_err(),
        EditError::KeyNotFound { step: 1, .. }
    ));
}

#[test]
fn test_delete() {
    let mut root = tree();

    Selector::parse("info files 0").delete(&mut root).unwrap();
    assert_eq!(
        Selector::parse("info files").select(&root).unwrap(),
        &Value::List(vec![Value::Integer(42)])
    );

    Selector::parse("name").delete(&mut root).unwrap();
    assert!(root.get(b"name").is_none());

    assert!(matches!(
        Selector::parse("name").delete(&mut root).unwrap_err(),
        EditError::KeyNotFound { step: 1, .. }
    ));
}

#[test]
fn test_null_selector_rejected_for_mutation() {
    let mut root = tree();
    assert!(matches!(
        Selector::parse("").set(&mut root, Value::Integer(0)).unwrap_err(),
        EditError::NullSelector
    ));
    assert!(matches!(
        Selector::parse(" \t ").delete(&mut root).unwrap_err(),
        EditError::NullSelector
    ));
}

#[test]
fn test_write_atomic_replaces_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.torrent");
    fs::write(&path, b"d1:ai1e1:bi2ee").unwrap();

    let mut root = decode(&fs::read(&path).unwrap()).unwrap();
    Selector::parse("b").set(&mut root, Value::Integer(3)).unwrap();
    write_atomic(&path, &root).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"d1:ai1e1:bi3ee");

    // A successful rename leaves no staging file behind.
    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["t.torrent".to_string()]);
}

#[test]
fn test_write_atomic_skips_stale_staging_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.torrent");
    fs::write(&path, b"d1:ai1ee").unwrap();

    // Leftover from a hypothetical interrupted run; must be skipped intact.
    let stale = temp.path().join(".t.torrent#1");
    fs::write(&stale, b"stale").unwrap();

    write_atomic(&path, &decode(b"d1:ai2ee").unwrap()).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"d1:ai2ee");
    assert_eq!(fs::read(&stale).unwrap(), b"stale");
}

#[test]
fn test_write_atomic_failure_leaves_source() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.torrent");
    fs::write(&path, b"d1:ai1ee").unwrap();

    // Writing through a directory that does not exist fails before rename.
    let bad = temp.path().join("no-such-dir").join("t.torrent");
    assert!(write_atomic(&bad, &decode(b"d1:ai2ee").unwrap()).is_err());

    assert_eq!(fs::read(&path).unwrap(), b"d1:ai1ee");
}
