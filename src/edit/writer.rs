use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use super::error::EditError;
use crate::bencode::{encode, Value};

/// Serializes `value` and replaces the file at `path` atomically.
///
/// The encoding is first written to a staging file `.<basename>#<n>` in the
/// same directory, created exclusively with the smallest free `n`, and then
/// renamed over `path`. Either the original content or the complete new
/// content is observable at `path`, never a partial write. Staging files
/// abandoned by an interrupted run are skipped by the exclusive-create
/// retry, not reused.
pub fn write_atomic(path: &Path, value: &Value) -> Result<(), EditError> {
    let encoded = encode(value);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let base = path.file_name().ok_or_else(|| EditError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"),
    })?;

    let mut n = 1u32;
    let (staging, mut file) = loop {
        let candidate = dir.join(format!(".{}#{}", base.to_string_lossy(), n));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => break (candidate, file),
            Err(source) if source.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(source) => {
                return Err(EditError::Io {
                    path: candidate,
                    source,
                })
            }
        }
    };

    file.write_all(&encoded).map_err(|source| EditError::Io {
        path: staging.clone(),
        source,
    })?;
    drop(file);

    fs::rename(&staging, path).map_err(|source| EditError::Io {
        path: path.to_path_buf(),
        source,
    })
}
