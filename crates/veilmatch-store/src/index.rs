//! The ledger index: the ordered list of record ids under [`INDEX_KEY`].
//!
//! The index is advisory. An empty or undecodable value reads as an empty
//! list so a corrupted index never blocks the client, and the next append
//! rewrites it.
//!
//! Appends are read-modify-write and **not atomic**. Two sessions
//! appending concurrently can each read the same list and the second write
//! drops the first session's id (last writer wins at the store). The
//! payload of the lost id stays in the store unreferenced. The contract
//! offers no conditional write to close this race.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use veilmatch_shared::codec::{decode_key_list, encode_key_list};
use veilmatch_shared::constants::INDEX_KEY;
use veilmatch_shared::{CodecError, MatchId};

use crate::error::Result;
use crate::store::KeyValueStore;

/// Result of reading the index.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    /// Record ids in append order.
    pub keys: Vec<MatchId>,
    /// Set when a non-empty index value failed to decode and was treated
    /// as empty.
    pub recovered: Option<CodecError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The id was added; `len` is the new index length.
    Appended { len: usize },
    /// The id was already listed and nothing was written.
    AlreadyPresent { len: usize },
}

#[derive(Clone)]
pub struct LedgerIndex {
    store: Arc<dyn KeyValueStore>,
}

impl LedgerIndex {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the index. Transport failures propagate; decode failures do not.
    pub async fn read(&self) -> Result<IndexSnapshot> {
        let bytes = self.store.get(INDEX_KEY).await?;
        if bytes.is_empty() {
            return Ok(IndexSnapshot::default());
        }

        match decode_key_list(&bytes) {
            Ok(keys) => {
                debug!(count = keys.len(), "Read ledger index");
                Ok(IndexSnapshot {
                    keys,
                    recovered: None,
                })
            }
            Err(e) => {
                warn!(error = %e, size = bytes.len(), "Ledger index is malformed, treating as empty");
                Ok(IndexSnapshot {
                    keys: Vec::new(),
                    recovered: Some(e),
                })
            }
        }
    }

    /// Append `id` unless it is already listed.
    pub async fn append(&self, id: &MatchId) -> Result<AppendOutcome> {
        let mut keys = self.read().await?.keys;
        if keys.contains(id) {
            debug!(id = %id, "Id already indexed");
            return Ok(AppendOutcome::AlreadyPresent { len: keys.len() });
        }

        keys.push(id.clone());
        let bytes = encode_key_list(&keys)?;
        self.store.set(INDEX_KEY, Bytes::from(bytes)).await?;

        debug!(id = %id, len = keys.len(), "Appended id to ledger index");
        Ok(AppendOutcome::Appended { len: keys.len() })
    }
}
