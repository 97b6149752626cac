//! Foundation types for twinpane.
//!
//! This crate provides the document, edit, and chunk types shared by every
//! other twinpane crate, plus the validated view configuration.
//!
//! # Key Types
//!
//! - [`Text`]: Immutable line-indexed document with byte offsets
//! - [`Edit`] / [`EditDescription`]: A transaction's replacements and the ranges they touched
//! - [`Chunk`] / [`Change`]: Line-aligned changed region and its character-level changes
//! - [`MergeConfig`]: Per-session view configuration, validated at setup

pub mod chunk;
pub mod config;
pub mod edit;
pub mod error;
pub mod text;

pub use chunk::{validate_chunks, Change, Chunk, ChunkId, Side};
pub use config::{CollapseConfig, MergeConfig};
pub use edit::{Assoc, ChangedRange, Edit, EditDescription, Replacement};
pub use error::{ConfigError, EditError, EditResult, InvariantViolation};
pub use text::{Line, Text, LINE_BREAK};
