//! Custom error types for the xplt-reader crate.

use std::fmt;

use thiserror::Error;

use super::models::ValueType;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum XpltError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream does not start with the FEBio file tag.
    #[error("This is not a valid XPLT file (file tag {0:#010x})")]
    NotXplt(u32),

    /// The header declares a version this reader cannot dispatch.
    #[error("Unsupported XPLT version: {0:#06x}")]
    UnsupportedVersion(u32),

    /// A read or a child chunk would run past the end of its enclosing chunk.
    #[error("Chunk overrun while reading {context}: requested {requested} bytes, {available} available")]
    ChunkOverrun {
        context: &'static str,
        requested: usize,
        available: usize,
    },

    /// The stream ended in the middle of a chunk tag, length or payload.
    #[error("Unexpected end of file while reading {0}")]
    ShortRead(&'static str),

    /// A chunk was opened or closed out of order.
    #[error("Chunk nesting violation: {0}")]
    NestingViolation(String),

    /// A mandatory chunk was not found where the format requires it.
    #[error("Expected chunk {expected:#010x}, found {found:#010x}")]
    UnexpectedChunk { expected: u32, found: u32 },

    /// A tag that is not allowed in a section without tolerance for unknown tags.
    #[error("Unknown tag {tag:#010x} in {section}")]
    UnknownTag { section: &'static str, tag: u32 },

    /// An error occurred while inflating a compressed chunk.
    #[error("Decompression failed: {0}")]
    DecompressionError(String),

    /// A declared count of items does not match the actual number of items found.
    #[error("Count mismatch for {item_type}: expected {expected}, but found {found}")]
    CountMismatch {
        item_type: String,
        expected: u64,
        found: u64,
    },

    /// A chunk payload has an unexpected size for the data it should hold.
    #[error("Size mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    SizeMismatch {
        context: String,
        expected: u64,
        found: u64,
    },

    /// Element type code outside the supported table.
    #[error("Unknown element type: {0}")]
    UnknownElementType(u32),

    /// Dictionary value type code outside the supported table.
    #[error("Unknown value type: {0}")]
    UnknownValueType(u32),

    /// Dictionary storage format code outside the supported table.
    #[error("Unknown storage format: {0}")]
    UnknownStorageFormat(u32),

    /// A value of one type was offered to a container of another.
    #[error("Type mismatch for {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: ValueType,
        found: ValueType,
    },

    /// A storage operation does not apply to the container's format.
    #[error("Storage format mismatch for {field}: {detail}")]
    FormatMismatch { field: String, detail: String },

    /// An index read from the file refers to something that does not exist.
    #[error("Invalid {what} index {index} (valid range 0..{len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A surface face could not be matched with a mesh face.
    #[error("Cannot find face {face} of surface {surface} in the mesh")]
    UnresolvedFace { surface: usize, face: usize },

    /// Mesh or state storage could not be allocated.
    #[error("Failed allocating {0}")]
    Allocation(String),

    /// The file is structurally invalid in a way not covered above.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A failure annotated with the section being read.
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<XpltError>,
    },
}

/// A convenience `Result` type alias using the crate's `XpltError` type.
pub type Result<T> = std::result::Result<T, XpltError>;

/// Attaches a human-readable section description to an error.
pub trait ResultExt<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;

    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| XpltError::Context {
            context: context.into(),
            source: Box::new(e),
        })
    }

    fn with_context<C: Into<String>, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| XpltError::Context {
            context: f().into(),
            source: Box::new(e),
        })
    }
}

/// The error returned by a failed load.
///
/// Holds one message per failure site, innermost first. The model built so far
/// is dropped; there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    messages: Vec<String>,
}

impl LoadError {
    /// All messages, innermost failure first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Number of recorded failures.
    pub fn count(&self) -> usize {
        self.messages.len()
    }

    /// The messages joined with newlines, ready for display.
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }
}

impl From<XpltError> for LoadError {
    fn from(err: XpltError) -> Self {
        let mut contexts = Vec::new();
        let mut current = err;
        loop {
            match current {
                XpltError::Context { context, source } => {
                    contexts.push(context);
                    current = *source;
                }
                other => {
                    let mut messages = vec![other.to_string()];
                    messages.extend(contexts.into_iter().rev());
                    return LoadError { messages };
                }
            }
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for LoadError {}
