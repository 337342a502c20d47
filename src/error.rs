//! Errors reported by sequence sources and the related file formats.

use std::io;

use thiserror::Error;

//-----------------------------------------------------------------------------

/// Errors from [`crate::SequenceSource`] and the I/O built on top of it.
///
/// Idempotent no-ops, such as adding an existing node or translating a known segment, are not errors.
/// A failing operation never leaves partial changes behind.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The caller passed an argument the operation cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No node with the given identifier has been stored.
    #[error("Node {0} not found")]
    NodeNotFound(usize),

    /// No segment with the given name has been translated.
    #[error("Segment {0} not found")]
    SegmentNotFound(String),

    /// Malformed input on the given line (1-based).
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SourceError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SourceError::Parse { line, message: message.into() }
    }

    /// Returns `true` if the error means that the requested node or segment was never ingested.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NodeNotFound(_) | SourceError::SegmentNotFound(_))
    }
}

//-----------------------------------------------------------------------------
