//! In-process ledger store.
//!
//! [`MemoryStore`] behaves like the remote contract (absent keys read as
//! empty bytes, writes are last-writer-wins) and lets callers inject
//! failures and stalls per key. It backs the local demo binary and the
//! test suites of the store and client crates.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::KeyValueStore;

/// Recorded call to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    IsAvailable,
    Get(String),
    Set(String),
}

#[derive(Default)]
struct MemoryState {
    values: HashMap<String, Bytes>,
    unavailable: bool,
    reject_writes: bool,
    failing_gets: HashMap<String, String>,
    failing_sets: HashMap<String, String>,
    gated_gets: HashMap<String, Arc<Notify>>,
    calls: Vec<StoreCall>,
}

/// Shared, cloneable in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a raw value without going through [`KeyValueStore::set`].
    pub fn put(&self, key: &str, value: impl Into<Bytes>) {
        self.state().values.insert(key.to_string(), value.into());
    }

    /// Raw value at `key`, if any.
    pub fn value(&self, key: &str) -> Option<Bytes> {
        self.state().values.get(key).cloned()
    }

    pub fn keys(&self) -> HashSet<String> {
        self.state().values.keys().cloned().collect()
    }

    pub fn set_available(&self, available: bool) {
        self.state().unavailable = !available;
    }

    /// Make every write fail as if the user declined the wallet prompt.
    pub fn reject_writes(&self, reject: bool) {
        self.state().reject_writes = reject;
    }

    /// Make reads of `key` fail with a transport error.
    pub fn fail_get(&self, key: &str, message: &str) {
        self.state()
            .failing_gets
            .insert(key.to_string(), message.to_string());
    }

    /// Make writes to `key` fail with a transport error.
    pub fn fail_set(&self, key: &str, message: &str) {
        self.state()
            .failing_sets
            .insert(key.to_string(), message.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing_gets.clear();
        state.failing_sets.clear();
        state.reject_writes = false;
    }

    /// Stall the next read of `key` until the returned handle is notified.
    pub fn gate_next_get(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state().gated_gets.insert(key.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// Number of recorded writes, to any key.
    pub fn write_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Set(_)))
            .count()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn is_available(&self) -> Result<bool> {
        let mut state = self.state();
        state.calls.push(StoreCall::IsAvailable);
        Ok(!state.unavailable)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let gate = {
            let mut state = self.state();
            state.calls.push(StoreCall::Get(key.to_string()));
            state.gated_gets.remove(key)
        };
        if let Some(gate) = gate {
            debug!(key, "Read stalled on gate");
            gate.notified().await;
        }

        let state = self.state();
        if state.unavailable {
            return Err(StoreError::Unavailable);
        }
        if let Some(message) = state.failing_gets.get(key) {
            return Err(StoreError::Transport(message.clone()));
        }
        Ok(state.values.get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::Set(key.to_string()));
        if state.unavailable {
            return Err(StoreError::Unavailable);
        }
        if state.reject_writes {
            return Err(StoreError::Rejected);
        }
        if let Some(message) = state.failing_sets.get(key) {
            return Err(StoreError::Transport(message.clone()));
        }
        debug!(key, size = value.len(), "Stored value");
        state.values.insert(key.to_string(), value);
        Ok(())
    }
}
