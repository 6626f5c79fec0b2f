//! btkit - tools for BitTorrent metainfo files
//!
//! This library is the shared engine behind a small suite of command-line
//! tools that inspect, verify, and edit `.torrent` files and the content
//! trees they describe.
//!
//! # Modules
//!
//! - [`bencode`] - canonical bencode decoding and encoding (BEP-3)
//! - [`metainfo`] - validated torrent documents and piece/fragment enumeration
//! - [`verify`] - on-disk content verification against the SHA-1 piece vector
//! - [`edit`] - selector-based tree editing and atomic write-back
//! - [`emit`] - pretty, JSON, and atom output for decoded trees

pub mod bencode;
pub mod edit;
pub mod emit;
pub mod metainfo;
pub mod verify;

pub use bencode::{decode, encode, BencodeError, Value};
pub use edit::{write_atomic, EditError, Selector};
pub use emit::{atom, jsonify, pretty, EmitError};
pub use metainfo::{FileEntry, Fragment, MetainfoError, Piece, Pieces, Torrent};
pub use verify::{verify, PieceNote, PieceReport, PieceStatus, Summary, VerifyError, VerifyOptions};
