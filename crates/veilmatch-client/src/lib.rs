//! # veilmatch-client
//!
//! Ledger synchronization for the VeilMatch client: wallet sessions, the
//! materialized record list, questionnaire submission and the status and
//! event channels the view layer observes.

pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod status;
pub mod sync;
pub mod wallet;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{ClientError, SubmissionFailure, WalletError};
pub use events::{EventReporter, LedgerEvent, SkipReason};
pub use session::{SessionManager, WalletTransport};
pub use stats::MatchStats;
pub use status::{StatusKind, SubmissionPhase, TransactionStatus};
pub use sync::{LedgerSynchronizer, LoadReport, RecordSnapshot};
pub use wallet::LocalWallet;

/// Install the global `tracing` subscriber (respects `RUST_LOG`).
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("veilmatch_client=debug,veilmatch_store=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
