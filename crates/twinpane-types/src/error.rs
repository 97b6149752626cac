use thiserror::Error;

/// Errors produced when applying an [`Edit`](crate::Edit) to a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("replacement {from}..{to} is out of bounds for a document of length {len}")]
    OutOfBounds { from: usize, to: usize, len: usize },

    #[error("replacement {from}..{to} is inverted")]
    Inverted { from: usize, to: usize },

    #[error("replacement starting at {from} overlaps the previous one ending at {prev_to}")]
    Overlapping { from: usize, prev_to: usize },

    #[error("position {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Convenience alias for edit results.
pub type EditResult<T> = Result<T, EditError>;

/// Errors produced when validating a [`MergeConfig`](crate::MergeConfig).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A broken chunk-list invariant, reported by
/// [`validate_chunks`](crate::validate_chunks).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("chunk {index} has an inverted range on side {side}")]
    Inverted { index: usize, side: char },

    #[error("chunk {index} overlaps or precedes chunk {prev}")]
    Unordered { index: usize, prev: usize },

    #[error("chunk {index} boundary {pos} on side {side} is not at a line start")]
    NotLineAligned { index: usize, side: char, pos: usize },

    #[error("chunk {index} is empty on both sides")]
    Empty { index: usize },

    #[error("chunk {index} has a change outside its extent")]
    ChangeOutOfBounds { index: usize },

    #[error("chunk {index} has overlapping or unsorted changes on side {side}")]
    ChangesUnordered { index: usize, side: char },
}
