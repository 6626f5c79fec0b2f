use std::path::PathBuf;

use crate::metainfo::Piece;

/// Verdict for a single piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceStatus {
    /// The assembled bytes hash to the expected SHA-1.
    Ok,
    /// Every fragment was read but the SHA-1 differs.
    HashMismatch,
    /// One or more fragments could not be fully read.
    AcquisitionFailed,
}

/// A problem observed while processing one piece.
///
/// Notes accompany the piece status: a size mismatch does not by itself stop
/// the read, and an extraction failure does not invalidate an `Ok` piece,
/// but every note counts toward the run's error total.
#[derive(Debug)]
pub enum PieceNote {
    OpenFailed {
        path: PathBuf,
        error: std::io::Error,
    },
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    ReadFailed {
        path: PathBuf,
        error: std::io::Error,
    },
    ExtractFailed {
        path: PathBuf,
        error: std::io::Error,
    },
}

/// Everything the verifier has to say about one piece.
#[derive(Debug)]
pub struct PieceReport<'a> {
    pub piece: Piece<'a>,
    pub status: PieceStatus,
    pub notes: Vec<PieceNote>,
}

impl PieceReport<'_> {
    /// True iff this piece contributed to the run's error total.
    pub fn has_errors(&self) -> bool {
        self.status != PieceStatus::Ok || !self.notes.is_empty()
    }
}

/// Final tally of a verification run.
#[derive(Debug)]
pub struct Summary {
    pub valid_pieces: u32,
    pub piece_count: u32,
    pub errors_detected: bool,
    /// Files found under the content root that the torrent does not declare
    /// (multi-file mode only). These do not count as errors.
    pub extra_files: Vec<PathBuf>,
}
