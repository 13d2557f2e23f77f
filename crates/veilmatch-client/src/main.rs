//! Local demo of the ledger layer.
//!
//! Runs one connect / submit / load cycle against an in-memory ledger with
//! a fixed wallet account and prints the resulting record list as JSON.
//!
//! Usage: `veilmatch [ACCOUNT] [PERSONALITY] [VALUES]`

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use veilmatch_client::{
    init_tracing, ClientConfig, EventReporter, LedgerSynchronizer, LocalWallet, SessionManager,
};
use veilmatch_shared::constants::APP_NAME;
use veilmatch_shared::{Address, Questionnaire};
use veilmatch_store::MemoryStore;

const DEMO_ACCOUNT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting {} ledger demo v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let mut args = std::env::args().skip(1);
    let account = Address::new(args.next().unwrap_or_else(|| DEMO_ACCOUNT.to_string()));
    let answers = Questionnaire::new(
        args.next().unwrap_or_else(|| "curious, calm".to_string()),
        args.next().unwrap_or_else(|| "honesty".to_string()),
    );

    let store = MemoryStore::new();
    let (events, mut event_rx) = EventReporter::channel();
    let session = Arc::new(SessionManager::new(events.clone()));
    let sync = LedgerSynchronizer::new(Arc::new(store.clone()), session.clone(), config, events);

    if !sync.check_availability().await? {
        anyhow::bail!("ledger store is not available");
    }
    sync.load_all().await.context("initial load failed")?;

    let wallet = Arc::new(LocalWallet::new(Arc::new(store.clone()), vec![account]));
    let address = session.connect(wallet).await?;
    info!(account = %address.short(), "Wallet connected");

    let id = sync.submit(&answers).await.context("submission failed")?;
    info!(%id, "Questionnaire recorded");

    let records = sync.records();
    println!("{}", serde_json::to_string_pretty(records.as_slice())?);
    println!("{}", serde_json::to_string(&sync.stats())?);

    session.disconnect();
    while let Ok(event) = event_rx.try_recv() {
        info!(event = %serde_json::to_string(&event)?, "Ledger event");
    }

    Ok(())
}
