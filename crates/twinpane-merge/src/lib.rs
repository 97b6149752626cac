//! Merge controller for twinpane.
//!
//! Holds one editable document (B) and one reference document (A) and keeps
//! their chunk list, collapsed spans, and rendered deletions in sync as
//! transactions arrive. Accepting a chunk copies its B text into A;
//! rejecting it copies the A text back into B. Either way the change is a
//! single edit that flows through the normal update path.
//!
//! # Key Types
//!
//! - [`MergeState`]: Immutable state; [`MergeState::reduce`] applies a [`Transaction`]
//! - [`accept_chunk`] / [`reject_chunk`]: Build the transaction for one chunk
//! - [`MergeController`]: Owns the current state plus the [`DeletionCache`]

pub mod cache;
pub mod controller;
pub mod error;
pub mod state;

pub use cache::DeletionCache;
pub use controller::MergeController;
pub use error::{MergeError, MergeResult};
pub use state::{accept_chunk, reject_chunk, Applied, Effect, MergeState, Transaction};
