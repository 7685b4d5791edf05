//! Exact nearest-neighbour index over (vector, chunk) entries.
//!
//! `FlatIndex` is the in-memory form; `IndexStore` owns the single file it is
//! persisted to and handles build / load / search against it.

pub mod flat;
pub mod store;

pub use flat::{FlatIndex, IndexEntry};
pub use store::{BuildReport, IndexStore, IndexStatus};
