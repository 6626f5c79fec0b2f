use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::error::{invalid, MetainfoError};
use super::pieces::Pieces;
use crate::bencode::{decode, Value};

const HASH_LEN: usize = 20;

/// A validated torrent metainfo document.
///
/// Owns its decoded bencode tree and exposes only borrows, so the document
/// is immutable for its whole lifetime. Construction validates the `info`
/// dictionary; any deviation is reported with the dotted path of the
/// offending entry (e.g. `.info.files[3].length`).
///
/// # Examples
///
/// ```no_run
/// use btkit::metainfo::Torrent;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let torrent = Torrent::load("example.torrent".as_ref())?;
/// println!("{}: {} bytes in {} pieces",
///     torrent.name(), torrent.length(), torrent.piece_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Torrent {
    data: Value,
    name: String,
    piece_length: u64,
    length: u64,
    piece_count: u32,
    pieces: Bytes,
    files: Vec<FileEntry>,
    multifile: bool,
    has_md5sum: bool,
}

/// A content file declared by a torrent.
///
/// The path is relative to the content root: for multi-file torrents the
/// joined `path` components, for single-file torrents the torrent name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub length: u64,
}

impl Torrent {
    /// Reads and parses a torrent file.
    pub fn load(path: &Path) -> Result<Self, MetainfoError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parses a torrent from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MetainfoError::Bencode`] when the bytes are not canonical
    /// bencode, or [`MetainfoError::Invalid`] when the decoded tree is not a
    /// well-formed metainfo document: missing or ill-typed `info` entries,
    /// negative lengths, `length` and `files` both present, a filename
    /// component that is empty, `.`, `..`, or contains `/`, or a `pieces`
    /// string whose hash count does not match the piece count.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let root = decode(data)?;
        Self::from_value(root)
    }

    /// Validates an already decoded tree and takes ownership of it.
    pub fn from_value(root: Value) -> Result<Self, MetainfoError> {
        if root.as_dict().is_none() {
            return Err(invalid(".", format!("expected dictionary, found {}", root.kind())));
        }

        let info = root
            .get(b"info")
            .ok_or_else(|| invalid(".info", "missing"))?;
        let info_dict = info
            .as_dict()
            .ok_or_else(|| invalid(".info", format!("expected dictionary, found {}", info.kind())))?;

        let name = filename_component(
            info_dict
                .get(b"name".as_slice())
                .ok_or_else(|| invalid(".info.name", "missing"))?,
            ".info.name",
        )?
        .to_string();

        let piece_length = info_dict
            .get(b"piece length".as_slice())
            .ok_or_else(|| invalid(".info.piece length", "missing"))?
            .as_integer()
            .ok_or_else(|| invalid(".info.piece length", "not an integer"))?;
        if piece_length <= 0 {
            return Err(invalid(".info.piece length", "not positive"));
        }
        let piece_length = piece_length as u64;

        let pieces = info_dict
            .get(b"pieces".as_slice())
            .ok_or_else(|| invalid(".info.pieces", "missing"))?
            .as_bytes()
            .ok_or_else(|| invalid(".info.pieces", "not a string"))?
            .clone();
        if pieces.len() % HASH_LEN != 0 {
            return Err(invalid(
                ".info.pieces",
                format!("length {} is not a multiple of {}", pieces.len(), HASH_LEN),
            ));
        }

        let single_length = info_dict.get(b"length".as_slice());
        let files_list = info_dict.get(b"files".as_slice());

        let (files, length, multifile) = match (single_length, files_list) {
            (Some(_), Some(_)) => {
                return Err(invalid(".info", "has both length and files"));
            }
            (Some(len), None) => {
                let len = non_negative(len, ".info.length")?;
                let entry = FileEntry {
                    path: PathBuf::from(&name),
                    length: len,
                };
                (vec![entry], len, false)
            }
            (None, Some(list)) => {
                let list = list
                    .as_list()
                    .ok_or_else(|| invalid(".info.files", "not a list"))?;
                if list.is_empty() {
                    return Err(invalid(".info.files", "empty"));
                }

                let mut files = Vec::with_capacity(list.len());
                let mut total = 0u64;
                for (i, entry) in list.iter().enumerate() {
                    let at = format!(".info.files[{}]", i);
                    let dict = entry
                        .as_dict()
                        .ok_or_else(|| invalid(at.as_str(), "not a dictionary"))?;

                    let len = non_negative(
                        dict.get(b"length".as_slice())
                            .ok_or_else(|| invalid(format!("{}.length", at), "missing"))?,
                        &format!("{}.length", at),
                    )?;

                    let components = dict
                        .get(b"path".as_slice())
                        .ok_or_else(|| invalid(format!("{}.path", at), "missing"))?
                        .as_list()
                        .ok_or_else(|| invalid(format!("{}.path", at), "not a list"))?;
                    if components.is_empty() {
                        return Err(invalid(format!("{}.path", at), "empty"));
                    }

                    let mut path = PathBuf::new();
                    for (j, component) in components.iter().enumerate() {
                        path.push(filename_component(
                            component,
                            &format!("{}.path[{}]", at, j),
                        )?);
                    }

                    total = total
                        .checked_add(len)
                        .ok_or_else(|| invalid(format!("{}.length", at), "total overflows"))?;
                    files.push(FileEntry { path, length: len });
                }
                (files, total, true)
            }
            (None, None) => {
                return Err(invalid(".info", "has neither length nor files"));
            }
        };

        let piece_count = length.div_ceil(piece_length);
        if (pieces.len() / HASH_LEN) as u64 != piece_count {
            return Err(invalid(
                ".info.pieces",
                format!(
                    "{} hashes for {} pieces",
                    pieces.len() / HASH_LEN,
                    piece_count
                ),
            ));
        }
        let piece_count = u32::try_from(piece_count)
            .map_err(|_| invalid(".info.pieces", "too many pieces"))?;

        let has_md5sum = info_dict.contains_key(b"md5sum".as_slice())
            || files_list
                .and_then(Value::as_list)
                .is_some_and(|list| {
                    list.iter()
                        .any(|e| e.get(b"md5sum").is_some())
                });

        Ok(Self {
            data: root,
            name,
            piece_length,
            length,
            piece_count,
            pieces,
            files,
            multifile,
            has_md5sum,
        })
    }

    /// The suggested name for the content file or directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total content length in bytes.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Number of bytes per piece (the last piece may be shorter).
    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    /// Number of pieces, `ceil(length / piece_length)`.
    pub fn piece_count(&self) -> u32 {
        self.piece_count
    }

    /// True iff the torrent declares a `files` list.
    pub fn is_multifile(&self) -> bool {
        self.multifile
    }

    /// True iff `info` carries `md5sum` entries (which this suite ignores).
    pub fn has_md5sum(&self) -> bool {
        self.has_md5sum
    }

    /// The expected SHA-1 of piece `index`, a 20-byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `index >= piece_count()`.
    pub fn piece_hash(&self, index: u32) -> &[u8] {
        let start = index as usize * HASH_LEN;
        &self.pieces[start..start + HASH_LEN]
    }

    /// The declared content files, in torrent order.
    ///
    /// A single-file torrent yields one synthesized entry whose path is the
    /// torrent name.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Iterates over the pieces, each as an ordered list of file fragments.
    pub fn pieces(&self) -> Pieces<'_> {
        Pieces::new(&self.files, self.piece_length, self.length, self.piece_count)
    }

    /// The whole decoded metainfo tree.
    pub fn value(&self) -> &Value {
        &self.data
    }
}

fn non_negative(value: &Value, path: &str) -> Result<u64, MetainfoError> {
    let n = value
        .as_integer()
        .ok_or_else(|| invalid(path, "not an integer"))?;
    if n < 0 {
        return Err(invalid(path, "negative"));
    }
    Ok(n as u64)
}

fn filename_component<'a>(value: &'a Value, path: &str) -> Result<&'a str, MetainfoError> {
    let bytes = value
        .as_bytes()
        .ok_or_else(|| invalid(path, "not a string"))?;
    let text = std::str::from_utf8(bytes).map_err(|_| invalid(path, "not valid utf-8"))?;
    if text.is_empty() {
        return Err(invalid(path, "empty filename component"));
    }
    if text == "." || text == ".." {
        return Err(invalid(path, "reserved filename component"));
    }
    if text.contains('/') {
        return Err(invalid(path, "filename component contains '/'"));
    }
    Ok(text)
}
