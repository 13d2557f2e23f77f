//! Structured reporting of contained failures.
//!
//! Failures that the ledger layer absorbs (a skipped record, a recovered
//! index, an orphaned payload) are logged through `tracing` and, when a
//! receiver is attached, delivered as [`LedgerEvent`]s so callers can
//! observe them.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use veilmatch_shared::{Address, MatchId};

/// Why a listed record was left out of a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    Fetch(String),
    Empty,
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    SessionConnected { address: Address },
    SessionDisconnected,
    StoreUnavailable,
    LoadFailed { reason: String },
    IndexRecovered { reason: String },
    RecordSkipped { id: MatchId, reason: SkipReason },
    StaleLoadDiscarded { generation: u64 },
    RecordSubmitted { id: MatchId },
    /// The payload of `id` was written but the index append failed, so no
    /// load will list it until the index is rebuilt.
    OrphanedRecord { id: MatchId, reason: String },
}

#[derive(Clone, Default)]
pub struct EventReporter {
    tx: Option<mpsc::UnboundedSender<LedgerEvent>>,
}

impl EventReporter {
    /// A reporter that only logs.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LedgerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn report(&self, event: LedgerEvent) {
        match &event {
            LedgerEvent::SessionConnected { address } => {
                info!(address = %address, "Wallet session connected")
            }
            LedgerEvent::SessionDisconnected => info!("Wallet session closed"),
            LedgerEvent::StoreUnavailable => warn!("Ledger store unavailable, load aborted"),
            LedgerEvent::LoadFailed { reason } => warn!(reason = %reason, "Ledger load failed"),
            LedgerEvent::IndexRecovered { reason } => {
                warn!(reason = %reason, "Ledger index unreadable, using empty index")
            }
            LedgerEvent::RecordSkipped { id, reason } => {
                warn!(id = %id, reason = ?reason, "Skipping record")
            }
            LedgerEvent::StaleLoadDiscarded { generation } => {
                info!(generation, "Discarding result of superseded load")
            }
            LedgerEvent::RecordSubmitted { id } => info!(id = %id, "Record submitted"),
            LedgerEvent::OrphanedRecord { id, reason } => {
                error!(id = %id, reason = %reason, "Record written but not indexed")
            }
        }

        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is listening any more.
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_events() {
        let (reporter, mut rx) = EventReporter::channel();
        reporter.report(LedgerEvent::StoreUnavailable);
        assert_eq!(rx.try_recv().unwrap(), LedgerEvent::StoreUnavailable);
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (reporter, rx) = EventReporter::channel();
        drop(rx);
        reporter.report(LedgerEvent::SessionDisconnected);
        EventReporter::silent().report(LedgerEvent::SessionDisconnected);
    }

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::RecordSkipped {
            id: MatchId::from("b"),
            reason: SkipReason::Fetch("timeout".into()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "record_skipped",
                "id": "b",
                "reason": { "cause": "fetch", "detail": "timeout" }
            })
        );
    }
}
