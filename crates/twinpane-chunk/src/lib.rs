//! Chunk store for twinpane.
//!
//! Keeps the sorted, non-overlapping, line-aligned list of changed chunks
//! between two documents up to date. The list is built once from a full
//! comparison and afterwards replaced on every edit by re-diffing only a
//! window around the edited ranges.
//!
//! # Key Types
//!
//! - [`ChunkStore`]: Owns the current chunk list and the diff settings
//! - [`build`] / [`update`]: The underlying pure functions
//! - [`chunk_at`] / [`map_pos`]: Position lookups over a chunk list

pub mod lookup;
pub mod store;

pub use lookup::{chunk_at, chunk_index_at, map_pos};
pub use store::{build, update, ChunkStore, DiffContext, UpdateRange, DEFAULT_UPDATE_MARGIN};
