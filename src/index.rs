//! Equality indexes.
//!
//! An equality index maps each distinct value of one column to the byte
//! offsets of the rows holding it, in insertion order. Indexes are declared
//! up front as `(table, column)` pairs, kept in an [`IndexRegistry`], updated
//! synchronously on insert and persisted as whole-structure snapshots.

pub mod equality;
pub mod registry;

pub use equality::EqualityIndex;
pub use registry::IndexRegistry;
