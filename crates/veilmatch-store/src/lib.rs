//! # veilmatch-store
//!
//! Access to the remote key-value ledger that holds VeilMatch records.
//!
//! The crate defines the [`KeyValueStore`] seam the client talks through,
//! an in-process [`MemoryStore`] implementation, and the [`LedgerIndex`]
//! that tracks which record ids exist.

pub mod index;
pub mod memory;
pub mod store;

mod error;

pub use error::StoreError;
pub use index::{AppendOutcome, IndexSnapshot, LedgerIndex};
pub use memory::{MemoryStore, StoreCall};
pub use store::KeyValueStore;
