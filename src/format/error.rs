//! Error type shared by every encode, decode and validate operation.

use std::io;

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Codec errors.
///
/// Every operation stops at the first error it meets. A corrupted command
/// stream cannot be resynchronized, so callers should reject the whole asset.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Truncated input: {what} needs {needed} bytes, {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("Invalid container: {0}")]
    Format(String),
    #[error("Unsupported opcode {0}")]
    UnsupportedOpcode(u8),
    #[error("Value {value} does not fit in a {bits}-bit field")]
    ValueTooLarge { value: usize, bits: u32 },
    #[error("Run command has no tiles")]
    EmptyRun,
    #[error("{what} {value} outside [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },
    #[error("{0} must be set before writing cells")]
    State(&'static str),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CodecError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        CodecError::Format(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        CodecError::Validation(msg.into())
    }
}
