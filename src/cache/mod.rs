//! Stack Cache Module
//!
//! Per-type in-memory stacks, built lazily from the type store.
//!
//! ## Responsibilities
//! - One id → record map per type tag, built by the first full scan
//! - Kept coherent by mutations, so existence checks stay in memory
//! - Explicit invalidation for partitions modified outside the engine
//!
//! ## Coherence Policy
//! Reads and existence checks both go through the cache: the cache never
//! disagrees with what this engine instance wrote. A partition changed
//! behind the engine's back is not observed until its entry is invalidated.
//! No cross-process coherence is promised.

mod table;

pub use table::StackCache;

/// A fully decoded type partition held in memory
pub type Stack = std::collections::HashMap<String, crate::record::Record>;
