use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

use super::error::VerifyError;
use super::report::{PieceNote, PieceReport, PieceStatus, Summary};
use crate::metainfo::Torrent;

/// Knobs for a verification run.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Stop after the first piece that reports any error.
    pub fail_fast: bool,
    /// Write every valid piece's bytes to `<dir>/<piece_index>`.
    pub extract_dir: Option<PathBuf>,
}

/// Verifies a torrent's content against its piece hashes.
///
/// Reads each piece's fragments from disk under `content_root` (in
/// multi-file mode the root is a directory and fragment paths are joined
/// onto it; in single-file mode the root is the content file itself),
/// assembles the piece in a single buffer, and compares its SHA-1 to the
/// expected hash. `on_piece` is invoked once per piece, in order.
///
/// A missing or short file marks the affected pieces, not the run: later
/// fragments are still probed so that every missing file is reported. After
/// the pieces, multi-file torrents get an extra-file sweep of the content
/// root; extras are listed in the summary but are not errors.
///
/// # Errors
///
/// Only a failure to create the extraction directory aborts the run; all
/// per-file I/O problems are reported through piece statuses and notes.
pub fn verify<F>(
    torrent: &Torrent,
    content_root: &Path,
    options: &VerifyOptions,
    mut on_piece: F,
) -> Result<Summary, VerifyError>
where
    F: FnMut(&PieceReport<'_>),
{
    if torrent.has_md5sum() {
        tracing::warn!("info contains md5sum entries; ignoring them");
    }

    if let Some(dir) = &options.extract_dir {
        fs::create_dir_all(dir).map_err(|source| VerifyError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    tracing::debug!(
        "verifying {} pieces against {}",
        torrent.piece_count(),
        content_root.display()
    );

    let mut open: Option<(PathBuf, File)> = None;
    let mut buf: Vec<u8> = Vec::new();
    let mut valid_pieces = 0u32;
    let mut errors_detected = false;

    for piece in torrent.pieces() {
        buf.clear();
        let mut notes = Vec::new();
        let mut acquisition_failed = false;

        for fragment in &piece.fragments {
            let path = if torrent.is_multifile() {
                content_root.join(fragment.path)
            } else {
                content_root.to_path_buf()
            };

            let cached = matches!(&open, Some((p, _)) if *p == path);
            if !cached {
                match File::open(&path) {
                    Ok(file) => open = Some((path.clone(), file)),
                    Err(error) => {
                        notes.push(PieceNote::OpenFailed { path, error });
                        acquisition_failed = true;
                        open = None;
                        continue;
                    }
                }
            }
            let Some((_, file)) = open.as_mut() else {
                continue;
            };

            match file.metadata() {
                Ok(meta) if meta.len() != fragment.file_length => {
                    notes.push(PieceNote::SizeMismatch {
                        path: path.clone(),
                        expected: fragment.file_length,
                        actual: meta.len(),
                    });
                    // Keep reading; a short read below catches the rest.
                }
                Ok(_) => {}
                Err(error) => {
                    notes.push(PieceNote::OpenFailed { path, error });
                    acquisition_failed = true;
                    open = None;
                    continue;
                }
            }

            let wanted = fragment.len() as usize;
            let start = buf.len();
            buf.resize(start + wanted, 0);

            let read = file
                .seek(SeekFrom::Start(fragment.range.start))
                .and_then(|_| file.read_exact(&mut buf[start..]));
            if let Err(error) = read {
                notes.push(PieceNote::ReadFailed { path, error });
                acquisition_failed = true;
                buf.truncate(start);
                open = None;
            }
        }

        let status = if acquisition_failed {
            PieceStatus::AcquisitionFailed
        } else if Sha1::digest(&buf).as_slice() == torrent.piece_hash(piece.index) {
            valid_pieces += 1;
            if let Some(dir) = &options.extract_dir {
                let target = dir.join(piece.index.to_string());
                if let Err(error) = fs::write(&target, &buf) {
                    notes.push(PieceNote::ExtractFailed {
                        path: target,
                        error,
                    });
                }
            }
            PieceStatus::Ok
        } else {
            PieceStatus::HashMismatch
        };

        let report = PieceReport {
            piece,
            status,
            notes,
        };
        if report.has_errors() {
            errors_detected = true;
        }
        on_piece(&report);

        if options.fail_fast && report.has_errors() {
            return Ok(Summary {
                valid_pieces,
                piece_count: torrent.piece_count(),
                errors_detected,
                extra_files: Vec::new(),
            });
        }
    }

    let extra_files = if torrent.is_multifile() {
        find_extra_files(torrent, content_root)
    } else {
        Vec::new()
    };

    tracing::debug!(
        "verification complete: {}/{} pieces valid",
        valid_pieces,
        torrent.piece_count()
    );

    Ok(Summary {
        valid_pieces,
        piece_count: torrent.piece_count(),
        errors_detected,
        extra_files,
    })
}

/// Walks the content root and returns the relative paths of regular files
/// the torrent does not declare, sorted.
fn find_extra_files(torrent: &Torrent, content_root: &Path) -> Vec<PathBuf> {
    let declared: HashSet<&Path> = torrent.files().iter().map(|f| f.path.as_path()).collect();

    let mut on_disk = Vec::new();
    walk(content_root, content_root, &mut on_disk);

    let mut extra: Vec<PathBuf> = on_disk
        .into_iter()
        .filter(|rel| !declared.contains(rel.as_path()))
        .collect();
    extra.sort();
    extra
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_path_buf());
        }
    }
}
