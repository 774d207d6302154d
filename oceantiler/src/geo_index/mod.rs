//! Spatial index of closed coastline regions.
//!
//! The index is built once while input features arrive, then sealed and
//! shared read-only by every splitter worker. The two phases are separate
//! types: [`RegionIndexBuilder`] accepts insertions,
//! [`RegionIndexBuilder::finalize`] returns the immutable
//! [`RegionIndex`] that only supports queries, so no locking is needed
//! during the parallel phase.

mod index;

pub use index::{RegionIndex, RegionIndexBuilder};
