//! Torrent metainfo handling (BEP-3)
//!
//! This module parses and validates `.torrent` documents and enumerates
//! their pieces as ordered lists of file fragments.

mod error;
mod pieces;
mod torrent;

pub use error::MetainfoError;
pub use pieces::{Fragment, Piece, Pieces};
pub use torrent::{FileEntry, Torrent};
