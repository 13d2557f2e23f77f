//! User-facing status channel.
//!
//! Long-running ledger operations publish a [`TransactionStatus`] that the
//! view shows as a toast. Terminal statuses hide themselves after a fixed
//! delay unless a newer status has been published in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionStatus {
    pub visible: bool,
    pub kind: StatusKind,
    pub message: String,
}

impl TransactionStatus {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            kind: StatusKind::Pending,
            message: String::new(),
        }
    }
}

/// Progress of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Encrypting,
    WritingPayload,
    AppendingIndex,
    Done,
    Failed,
}

#[derive(Clone)]
pub struct StatusChannel {
    tx: Arc<watch::Sender<TransactionStatus>>,
    // Bumped on every publish so a pending auto-dismiss can tell it has
    // been superseded.
    generation: Arc<AtomicU64>,
    success_dismiss: Duration,
    error_dismiss: Duration,
}

impl StatusChannel {
    pub fn new(success_dismiss: Duration, error_dismiss: Duration) -> Self {
        let (tx, _) = watch::channel(TransactionStatus::hidden());
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            success_dismiss,
            error_dismiss,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> TransactionStatus {
        self.tx.borrow().clone()
    }

    pub fn pending(&self, message: impl Into<String>) {
        self.publish(StatusKind::Pending, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        let generation = self.publish(StatusKind::Success, message.into());
        self.dismiss_after(generation, self.success_dismiss);
    }

    pub fn error(&self, message: impl Into<String>) {
        let generation = self.publish(StatusKind::Error, message.into());
        self.dismiss_after(generation, self.error_dismiss);
    }

    fn publish(&self, kind: StatusKind, message: String) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(TransactionStatus {
            visible: true,
            kind,
            message,
        });
        generation
    }

    // Outside a runtime the status stays up until the next publish.
    fn dismiss_after(&self, generation: u64, delay: Duration) {
        let Ok(handle) = Handle::try_current() else {
            debug!("No Tokio runtime, status will not auto-dismiss");
            return;
        };
        let tx = self.tx.clone();
        let current = self.generation.clone();
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                tx.send_replace(TransactionStatus::hidden());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_terminal_status_is_dismissed() {
        let status = StatusChannel::new(Duration::from_millis(10), Duration::from_millis(10));
        status.success("done");
        assert_eq!(status.current().kind, StatusKind::Success);
        assert!(status.current().visible);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(status.current(), TransactionStatus::hidden());
    }

    #[tokio::test]
    async fn test_newer_status_survives_old_dismiss() {
        let status = StatusChannel::new(Duration::from_millis(10), Duration::from_secs(60));
        status.success("first");
        status.error("second");

        tokio::time::sleep(Duration::from_millis(60)).await;
        let current = status.current();
        assert!(current.visible);
        assert_eq!(current.kind, StatusKind::Error);
        assert_eq!(current.message, "second");
    }

    #[test]
    fn test_terminal_status_without_runtime_stays_visible() {
        let status = StatusChannel::new(Duration::from_millis(1), Duration::from_millis(1));
        status.success("saved");
        let current = status.current();
        assert!(current.visible);
        assert_eq!(current.kind, StatusKind::Success);

        status.error("failed");
        assert_eq!(status.current().message, "failed");
    }

    #[tokio::test]
    async fn test_pending_is_not_dismissed() {
        let status = StatusChannel::new(Duration::from_millis(5), Duration::from_millis(5));
        status.pending("working");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(status.current().visible);
    }
}
