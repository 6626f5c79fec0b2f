use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use sha1::{Digest, Sha1};
use tempfile::TempDir;

use super::*;
use crate::bencode::{encode, Value};
use crate::metainfo::Torrent;

fn key(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

fn piece_hashes(content: &[u8], piece_length: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in content.chunks(piece_length) {
        out.extend_from_slice(&Sha1::digest(chunk));
    }
    out
}

fn multi_file_torrent(piece_length: i64, files: &[(&[&str], &[u8])]) -> Torrent {
    let content: Vec<u8> = files.iter().flat_map(|(_, data)| data.iter().copied()).collect();

    let entries = files
        .iter()
        .map(|(components, data)| {
            let mut entry = BTreeMap::new();
            entry.insert(key("length"), Value::Integer(data.len() as i64));
            entry.insert(
                key("path"),
                Value::List(components.iter().map(|c| Value::string(c)).collect()),
            );
            Value::Dict(entry)
        })
        .collect();

    let mut info = BTreeMap::new();
    info.insert(key("files"), Value::List(entries));
    info.insert(key("name"), Value::string("content"));
    info.insert(key("piece length"), Value::Integer(piece_length));
    info.insert(
        key("pieces"),
        Value::Bytes(Bytes::from(piece_hashes(&content, piece_length as usize))),
    );
    let mut root = BTreeMap::new();
    root.insert(key("info"), Value::Dict(info));

    Torrent::from_bytes(&encode(&Value::Dict(root))).unwrap()
}

fn single_file_torrent(piece_length: i64, content: &[u8]) -> Torrent {
    let mut info = BTreeMap::new();
    info.insert(key("length"), Value::Integer(content.len() as i64));
    info.insert(key("name"), Value::string("data.bin"));
    info.insert(key("piece length"), Value::Integer(piece_length));
    info.insert(
        key("pieces"),
        Value::Bytes(Bytes::from(piece_hashes(content, piece_length as usize))),
    );
    let mut root = BTreeMap::new();
    root.insert(key("info"), Value::Dict(info));

    Torrent::from_bytes(&encode(&Value::Dict(root))).unwrap()
}

fn write_content(root: &Path, files: &[(&[&str], &[u8])]) {
    for (components, data) in files {
        let mut path = root.to_path_buf();
        for c in *components {
            path.push(c);
        }
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, data).unwrap();
    }
}

fn run(torrent: &Torrent, root: &Path, options: &VerifyOptions) -> (Vec<(u32, PieceStatus, usize)>, Summary) {
    let mut reports = Vec::new();
    let summary = verify(torrent, root, options, |report| {
        reports.push((report.piece.index, report.status, report.notes.len()));
    })
    .unwrap();
    (reports, summary)
}

const FILES: &[(&[&str], &[u8])] = &[(&["f1"], b"abc"), (&["f2"], b"defgh")];

#[test]
fn test_all_pieces_valid() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    write_content(&root, FILES);

    let torrent = multi_file_torrent(4, FILES);
    let (reports, summary) = run(&torrent, &root, &VerifyOptions::default());

    assert_eq!(
        reports,
        vec![(0, PieceStatus::Ok, 0), (1, PieceStatus::Ok, 0)]
    );
    assert_eq!(summary.valid_pieces, 2);
    assert_eq!(summary.piece_count, 2);
    assert!(!summary.errors_detected);
    assert!(summary.extra_files.is_empty());
}

#[test]
fn test_hash_mismatch() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    write_content(&root, FILES);
    // Corrupt the last byte: only piece 1 is affected.
    fs::write(root.join("f2"), b"defgX").unwrap();

    let torrent = multi_file_torrent(4, FILES);
    let (reports, summary) = run(&torrent, &root, &VerifyOptions::default());

    assert_eq!(
        reports,
        vec![(0, PieceStatus::Ok, 0), (1, PieceStatus::HashMismatch, 0)]
    );
    assert_eq!(summary.valid_pieces, 1);
    assert!(summary.errors_detected);
}

#[test]
fn test_missing_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    write_content(&root, &FILES[..1]);

    let torrent = multi_file_torrent(4, FILES);
    let (reports, summary) = run(&torrent, &root, &VerifyOptions::default());

    // Both pieces touch f2; each reports the failed open.
    assert_eq!(
        reports,
        vec![
            (0, PieceStatus::AcquisitionFailed, 1),
            (1, PieceStatus::AcquisitionFailed, 1),
        ]
    );
    assert_eq!(summary.valid_pieces, 0);
    assert!(summary.errors_detected);
}

#[test]
fn test_size_mismatch_keeps_reading() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    write_content(&root, FILES);
    // Truncate f2 from 5 to 3 bytes: piece 0 still assembles, piece 1 cannot.
    fs::write(root.join("f2"), b"def").unwrap();

    let torrent = multi_file_torrent(4, FILES);
    let mut notes = Vec::new();
    let summary = verify(&torrent, &root, &VerifyOptions::default(), |report| {
        for note in &report.notes {
            notes.push((report.piece.index, format!("{note:?}")));
        }
    })
    .unwrap();

    assert_eq!(summary.valid_pieces, 1);
    assert!(summary.errors_detected);
    assert!(notes[0].1.contains("SizeMismatch"));
    assert!(notes.iter().any(|(_, n)| n.contains("ReadFailed")));
}

#[test]
fn test_single_file_explicit_checkee() {
    let temp = TempDir::new().unwrap();
    let checkee = temp.path().join("renamed.bin");
    fs::write(&checkee, b"abcdefgh").unwrap();

    let torrent = single_file_torrent(4, b"abcdefgh");
    let (reports, summary) = run(&torrent, &checkee, &VerifyOptions::default());

    assert_eq!(
        reports,
        vec![(0, PieceStatus::Ok, 0), (1, PieceStatus::Ok, 0)]
    );
    assert!(!summary.errors_detected);
}

#[test]
fn test_extra_file_detection() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    let files: &[(&[&str], &[u8])] = &[(&["dir", "x"], b"ab"), (&["dir", "y"], b"cd")];
    write_content(&root, files);
    fs::write(root.join("dir").join("z"), b"!").unwrap();

    let torrent = multi_file_torrent(4, files);
    let (_, summary) = run(&torrent, &root, &VerifyOptions::default());

    assert!(!summary.errors_detected);
    assert_eq!(summary.extra_files, vec![PathBuf::from("dir/z")]);
}

#[test]
fn test_extract_valid_pieces() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    write_content(&root, FILES);
    let extract = temp.path().join("pieces");

    let torrent = multi_file_torrent(4, FILES);
    let options = VerifyOptions {
        fail_fast: false,
        extract_dir: Some(extract.clone()),
    };
    let (_, summary) = run(&torrent, &root, &options);

    assert!(!summary.errors_detected);
    assert_eq!(fs::read(extract.join("0")).unwrap(), b"abcd");
    assert_eq!(fs::read(extract.join("1")).unwrap(), b"efgh");
}

#[test]
fn test_fail_fast_stops_after_first_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    write_content(&root, FILES);
    // Corrupt the first byte: piece 0 fails.
    fs::write(root.join("f1"), b"Xbc").unwrap();

    let torrent = multi_file_torrent(4, FILES);
    let options = VerifyOptions {
        fail_fast: true,
        extract_dir: None,
    };
    let (reports, summary) = run(&torrent, &root, &options);

    assert_eq!(reports, vec![(0, PieceStatus::HashMismatch, 0)]);
    assert!(summary.errors_detected);
}
