//! Wallet session management.
//!
//! A [`SessionManager`] holds at most one connected [`WalletTransport`] and
//! the account address it currently reports. The address changes when the
//! transport fires an account-change notification; readers always get a
//! snapshot, so a caller that needs a stable owner must capture it once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use veilmatch_shared::Address;
use veilmatch_store::KeyValueStore;

use crate::error::{ClientError, WalletError};
use crate::events::{EventReporter, LedgerEvent};

/// Callback invoked with the new account list on account changes.
pub type AccountsCallback = Box<dyn Fn(&[Address]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The wallet provider a session is established through.
#[async_trait]
pub trait WalletTransport: Send + Sync {
    /// Ask the user for account access. The first account is the primary one.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Register a callback for account changes.
    fn on_accounts_changed(&self, callback: AccountsCallback) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);

    /// Store handle whose writes are signed by this wallet.
    fn signing_store(&self) -> Arc<dyn KeyValueStore>;
}

/// Account-change registration, removed from the transport when dropped.
pub struct Subscription {
    transport: Arc<dyn WalletTransport>,
    id: ListenerId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.transport.remove_listener(self.id);
        debug!(listener = self.id.0, "Removed account listener");
    }
}

/// What a write needs from the session, captured at one instant.
#[derive(Clone)]
pub struct SessionSigner {
    pub owner: Address,
    pub store: Arc<dyn KeyValueStore>,
}

#[derive(Default)]
struct SessionState {
    // Incremented on every connect/disconnect; callbacks registered for an
    // older connection are ignored.
    epoch: u64,
    address: Option<Address>,
    transport: Option<Arc<dyn WalletTransport>>,
}

#[derive(Default)]
pub struct SessionManager {
    state: Arc<Mutex<SessionState>>,
    subscription: Mutex<Option<Subscription>>,
    events: EventReporter,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionManager {
    pub fn new(events: EventReporter) -> Self {
        Self {
            state: Arc::default(),
            subscription: Mutex::new(None),
            events,
        }
    }

    /// Connect through `transport`, replacing any existing session.
    ///
    /// Returns the primary account address.
    pub async fn connect(&self, transport: Arc<dyn WalletTransport>) -> Result<Address, ClientError> {
        let accounts = transport.request_accounts().await?;
        // Only the first account counts, the same rule as account changes.
        let primary = accounts
            .first()
            .filter(|a| !a.is_empty())
            .cloned()
            .ok_or_else(|| ClientError::Connection("wallet returned no accounts".to_string()))?;

        // Tear down the previous listener before the new one can fire.
        let previous = lock(&self.subscription).take();
        drop(previous);

        let epoch = {
            let mut state = lock(&self.state);
            state.epoch += 1;
            state.address = Some(primary.clone());
            state.transport = Some(transport.clone());
            state.epoch
        };

        let shared = self.state.clone();
        let id = transport.on_accounts_changed(Box::new(move |accounts: &[Address]| {
            let mut state = lock(&shared);
            if state.epoch != epoch {
                return;
            }
            let next = accounts.first().filter(|a| !a.is_empty()).cloned();
            debug!(account = ?next, "Wallet accounts changed");
            state.address = next;
        }));

        *lock(&self.subscription) = Some(Subscription { transport, id });

        self.events.report(LedgerEvent::SessionConnected {
            address: primary.clone(),
        });
        Ok(primary)
    }

    /// Drop the session and its account listener. Idempotent.
    pub fn disconnect(&self) {
        let subscription = lock(&self.subscription).take();
        let was_connected = {
            let mut state = lock(&self.state);
            state.epoch += 1;
            state.address = None;
            state.transport.take().is_some()
        };
        drop(subscription);

        if was_connected {
            self.events.report(LedgerEvent::SessionDisconnected);
        }
    }

    pub fn active_address(&self) -> Option<Address> {
        lock(&self.state).address.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.active_address().is_some()
    }

    /// Owner and signing store, or `None` when no account is active.
    pub fn signer(&self) -> Option<SessionSigner> {
        let state = lock(&self.state);
        let owner = state.address.clone()?;
        let transport = state.transport.as_ref()?;
        Some(SessionSigner {
            owner,
            store: transport.signing_store(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::LocalWallet;
    use veilmatch_store::MemoryStore;

    fn wallet(accounts: &[&str]) -> Arc<LocalWallet> {
        Arc::new(LocalWallet::new(
            Arc::new(MemoryStore::new()),
            accounts.iter().map(|a| Address::from(*a)).collect(),
        ))
    }

    #[tokio::test]
    async fn test_connect_returns_primary_account() {
        let session = SessionManager::default();
        let address = session.connect(wallet(&["0xABC", "0xDEF"])).await.unwrap();

        assert_eq!(address, Address::from("0xABC"));
        assert_eq!(session.active_address(), Some(address));
        assert!(session.signer().is_some());
    }

    #[tokio::test]
    async fn test_connect_without_accounts_fails() {
        let session = SessionManager::default();
        let err = session.connect(wallet(&[])).await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_connect_with_empty_primary_account_fails() {
        let session = SessionManager::default();
        let w = wallet(&["", "0xABC"]);

        let err = session.connect(w.clone()).await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
        assert!(!session.is_connected());
        assert_eq!(session.active_address(), None);
        assert_eq!(w.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_denied_fails() {
        let session = SessionManager::default();
        let w = wallet(&["0xABC"]);
        w.deny_access(true);

        let err = session.connect(w.clone()).await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
        assert_eq!(w.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_account_change_updates_address() {
        let session = SessionManager::default();
        let w = wallet(&["0xABC"]);
        session.connect(w.clone()).await.unwrap();

        w.switch_accounts(vec![Address::from("0x123")]);
        assert_eq!(session.active_address(), Some(Address::from("0x123")));

        w.switch_accounts(Vec::new());
        assert_eq!(session.active_address(), None);
        assert!(session.signer().is_none());
    }

    #[tokio::test]
    async fn test_disconnect_unsubscribes_and_is_idempotent() {
        let (events, mut rx) = EventReporter::channel();
        let session = SessionManager::new(events);
        let w = wallet(&["0xABC"]);
        session.connect(w.clone()).await.unwrap();
        assert_eq!(w.listener_count(), 1);

        session.disconnect();
        session.disconnect();
        assert_eq!(w.listener_count(), 0);
        assert!(session.signer().is_none());

        w.switch_accounts(vec![Address::from("0x999")]);
        assert_eq!(session.active_address(), None);

        assert!(matches!(rx.try_recv(), Ok(LedgerEvent::SessionConnected { .. })));
        assert_eq!(rx.try_recv().unwrap(), LedgerEvent::SessionDisconnected);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reconnect_replaces_listener() {
        let session = SessionManager::default();
        let first = wallet(&["0xAAA"]);
        let second = wallet(&["0xBBB"]);

        session.connect(first.clone()).await.unwrap();
        session.connect(second.clone()).await.unwrap();
        assert_eq!(first.listener_count(), 0);
        assert_eq!(second.listener_count(), 1);

        first.switch_accounts(vec![Address::from("0xCCC")]);
        assert_eq!(session.active_address(), Some(Address::from("0xBBB")));
    }
}
