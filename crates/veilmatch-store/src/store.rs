//! The remote key-value ledger as seen by the client.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// A generic key-value contract.
///
/// Reads may go through a read-only handle; writes must go through the
/// handle bound to the connected wallet, which prompts for authorization.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Check whether the contract is deployed and answering.
    async fn is_available(&self) -> Result<bool>;

    /// Fetch the value at `key`. An absent key yields empty bytes.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Write `value` at `key`, resolving once the transaction is confirmed.
    async fn set(&self, key: &str, value: Bytes) -> Result<()>;
}
