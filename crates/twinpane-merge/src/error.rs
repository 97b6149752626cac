//! Error types for the merge crate.

use twinpane_types::{ConfigError, EditError, Side};

/// Errors that can occur while applying a transaction.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The transaction's edit did not fit the document it targets.
    #[error("invalid edit to document {side}: {source}")]
    Edit {
        side: Side,
        #[source]
        source: EditError,
    },

    /// A reconfigure request carried an invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
