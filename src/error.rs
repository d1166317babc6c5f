//! Error types for unbhf library.

use crate::bhf::RecordType;
use std::io;
use thiserror::Error;

/// Result type alias for unbhf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unbhf library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Fewer bytes were available than a fixed-size read required.
    #[error("Short read at offset {offset}: trying to read {expected} bytes got {got} bytes")]
    ShortRead {
        offset: u64,
        expected: usize,
        got: usize,
    },

    /// A record required at this position carries a different type tag.
    #[error("Unexpected record at offset {offset}: expected {expected:?}, found type {found:#04x}")]
    UnexpectedRecordType {
        offset: u64,
        expected: RecordType,
        found: u8,
    },

    /// The byte following the stamp is not the 0x1A end-of-stamp marker.
    #[error("Invalid end-of-stamp sentinel: expected 0x1a, found {found:#04x}")]
    InvalidSentinel { found: u8 },

    /// The compression record declares a scheme other than nibble coding.
    #[error("Unsupported compression type: {0}")]
    UnsupportedCompression(u8),

    /// The record at a context offset is not a Text record.
    #[error("Record at offset {offset} is not a text record (type {found:#04x})")]
    NotTextRecord { offset: u64, found: u8 },

    /// A context offset that cannot address a record.
    #[error("Invalid context offset: {0}")]
    InvalidContextOffset(i32),

    /// A context id outside the context table.
    #[error("Unknown context id: {0}")]
    UnknownContext(u16),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the file offset the error refers to, when known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::ShortRead { offset, .. }
            | Error::UnexpectedRecordType { offset, .. }
            | Error::NotTextRecord { offset, .. } => Some(*offset),
            Error::InvalidContextOffset(offset) => u64::try_from(*offset).ok(),
            _ => None,
        }
    }
}

/// A recorded, non-fatal (or reported) problem found while decoding.
///
/// Diagnostics survive the call that produced them and can be inspected
/// through [`crate::BhfFile::last_error`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    /// File offset the problem refers to, if known.
    pub offset: Option<u64>,
    /// Human readable description.
    pub message: String,
}

impl From<&Error> for Diagnostic {
    fn from(err: &Error) -> Self {
        Self {
            offset: err.offset(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "[{:#x}] {}", offset, self.message),
            None => f.write_str(&self.message),
        }
    }
}
