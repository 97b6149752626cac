//! Diff engine for twinpane.
//!
//! Compares two strings and produces an ordered list of character-level
//! [`Change`](twinpane_types::Change)s over byte offsets. The chunk store
//! only depends on the [`DiffEngine`] trait; [`PresentableDiff`] is the
//! default implementation, built on the `similar` crate.
//!
//! # Key Types
//!
//! - [`DiffEngine`]: The comparison contract
//! - [`DiffBudget`]: Effort limit; exceeding it yields coarser output, never an error
//! - [`PresentableDiff`]: Line-first Myers diff refined to characters

pub mod engine;
pub mod presentable;

pub use engine::{DiffBudget, DiffEngine};
pub use presentable::PresentableDiff;
