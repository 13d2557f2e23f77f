//! In-process wallet transport.
//!
//! [`LocalWallet`] hands out a fixed account list and signs writes by
//! passing them straight to a wrapped store. It drives the demo binary and
//! tests, and can simulate the user denying access or switching accounts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use veilmatch_shared::Address;
use veilmatch_store::KeyValueStore;

use crate::error::WalletError;
use crate::session::{AccountsCallback, ListenerId, WalletTransport};

type Listener = Arc<dyn Fn(&[Address]) + Send + Sync>;

pub struct LocalWallet {
    store: Arc<dyn KeyValueStore>,
    accounts: Mutex<Vec<Address>>,
    listeners: Mutex<HashMap<ListenerId, Listener>>,
    next_listener: AtomicU64,
    denied: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LocalWallet {
    pub fn new(store: Arc<dyn KeyValueStore>, accounts: Vec<Address>) -> Self {
        Self {
            store,
            accounts: Mutex::new(accounts),
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            denied: AtomicBool::new(false),
        }
    }

    /// Make account requests fail as if the user closed the prompt.
    pub fn deny_access(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }

    /// Replace the account list and notify every listener.
    pub fn switch_accounts(&self, accounts: Vec<Address>) {
        *lock(&self.accounts) = accounts.clone();
        // Call outside the lock so listeners may touch the wallet.
        let listeners: Vec<Listener> = lock(&self.listeners).values().cloned().collect();
        for listener in listeners {
            listener(&accounts);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

#[async_trait]
impl WalletTransport for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(WalletError::AccessDenied);
        }
        Ok(lock(&self.accounts).clone())
    }

    fn on_accounts_changed(&self, callback: AccountsCallback) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        lock(&self.listeners).insert(id, Arc::from(callback));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        lock(&self.listeners).remove(&id);
    }

    fn signing_store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }
}
