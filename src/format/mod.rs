//! Binary container format.
//!
//! # Layout
//!
//! An asset is a flat sequence of chunks:
//!
//! ```text
//! Chunk header (4 bytes):
//!   Signature: 2 ASCII bytes ("P1", "T1", "A1", "F1")
//!   Total length: u16 big-endian, header included
//!
//! Chunk body (total length - 4 bytes):
//!   Section payload, zero-padded to an even length
//! ```
//!
//! An optional Palette and an optional Tileset come first, then each
//! Animation chunk followed by its Frame chunks in playback order. Each
//! frame body holds a draw-command stream (see [`command`]).

pub mod chunk;
pub mod command;
mod error;
mod reader;
mod sections;

pub use chunk::{Chunks, RawChunk, Section, Signature, read_chunk, read_chunks, write_chunk};
pub use command::{
    Command, MAX_SPAN, Opcode, coverage, decode_commands, encode_commands, printable,
};
pub use error::{CodecError, Result};
pub use reader::ByteReader;
pub use sections::{
    ANIMATION_SIGNATURE, AnimationHeader, FRAME_SIGNATURE, PALETTE_SIGNATURE, ROOT_SIGNATURES,
    TILESET_SIGNATURE, decode_asset, encode_asset,
};
