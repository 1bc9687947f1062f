use std::path::PathBuf;

use thiserror::Error;

use super::segment::SegmentKind;

/// Every way an editing run can fail or partially reject its input.
///
/// `MalformedOperation` and `UnknownOperationKind` are recoverable: the
/// normalizer skips the entry and reports it alongside the accepted
/// operations. Everything else aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("malformed operation at index {index}: {reason}")]
    MalformedOperation { index: usize, reason: String },

    #[error("unknown operation kind '{kind}' at index {index} (expected blur or remove)")]
    UnknownOperationKind { index: usize, kind: String },

    #[error("cannot parse timestamp '{timestamp}' (expected HH:MM:SS or HH:MM:SS.ffffff)")]
    TimestampParse { timestamp: String },

    #[error("invalid edit configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load operations from {path}: {message}")]
    OperationSource { path: PathBuf, message: String },

    #[error("failed to read source media: {0}")]
    Source(String),

    #[error("failed to render {kind} segment [{start:.3}s, {end:.3}s): {message}")]
    Render {
        kind: SegmentKind,
        start: f64,
        end: f64,
        message: String,
    },

    #[error("failed to assemble output: {0}")]
    Assembly(String),

    #[error("edit cancelled")]
    Cancelled,

    #[error("pipeline already executed")]
    AlreadyExecuted,
}

impl EditError {
    /// True for per-entry normalization problems that skip one record
    /// without failing the batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EditError::MalformedOperation { .. } | EditError::UnknownOperationKind { .. }
        )
    }
}
