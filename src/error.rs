//! Error types for spoolkit

use std::path::PathBuf;

/// Convenience alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for spoolkit operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resource reference names something that cannot be opened as a file
    #[error("Resource must be a file path or an open stream, got {kind}")]
    InvalidResourceKind {
        /// What the reference actually named (e.g. "directory")
        kind: String,
    },

    /// A path opened for reading does not exist
    #[error("Resource not found: {}", path.display())]
    ResourceNotFound {
        /// The path that was looked up
        path: PathBuf,
    },

    /// A mode string outside the `r`/`w`/`a` + `t`/`b` vocabulary
    #[error("Invalid open mode: {0:?}")]
    InvalidMode(String),

    /// Encoding or decoding a record failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True if this error is a record encode/decode failure
    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Serialization(_))
    }
}

/// Failure to encode or decode a record.
///
/// Offsets are byte positions from where the reader started, which for a
/// freshly opened file is the start of the file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializationError {
    /// The source held no record at all
    #[error("No record to read: source is empty")]
    Empty,

    /// The source ended in the middle of a record
    #[error("Record truncated at offset {offset}")]
    Truncated {
        /// Offset at which more bytes were expected
        offset: u64,
    },

    /// A type tag that does not belong to the record format
    #[error("Unknown type tag 0x{tag:02x} at offset {offset}")]
    UnknownTag {
        /// The offending byte
        tag: u8,
        /// Offset of the tag
        offset: u64,
    },

    /// A boolean payload other than 0 or 1
    #[error("Invalid boolean byte 0x{byte:02x} at offset {offset}")]
    InvalidBool {
        /// The offending byte
        byte: u8,
        /// Offset of the payload
        offset: u64,
    },

    /// Text payload that is not valid UTF-8
    #[error("Invalid UTF-8 in text at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the text payload
        offset: u64,
    },

    /// A declared length above the configured limit
    #[error("Length {length} exceeds limit {limit} at offset {offset}")]
    LengthLimit {
        /// Declared length
        length: u64,
        /// Configured maximum
        limit: u64,
        /// Offset of the length prefix
        offset: u64,
    },

    /// Values nested deeper than the configured limit
    #[error("Nesting depth exceeds limit {limit}")]
    DepthExceeded {
        /// Configured maximum depth
        limit: usize,
    },
}
