//! Ledger synchronization.
//!
//! [`LedgerSynchronizer`] materializes the ledger into an ordered in-memory
//! record list and performs the two-step submission write. It is the only
//! writer of the record list.
//!
//! Loads read the index, then fetch and decode each listed record. A record
//! that cannot be fetched or decoded is reported and skipped; it never fails
//! the load. The finished list replaces the previous one in a single swap,
//! and only if no newer load has already been applied.
//!
//! Submissions write the record payload first and the index second, so the
//! index never lists an id without a payload. The reverse can happen: if
//! the index append fails the payload is orphaned and reported as such.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use veilmatch_shared::codec::{decode_record, encode_record};
use veilmatch_shared::{cipher, MatchId, MatchRecord, Questionnaire};
use veilmatch_store::{KeyValueStore, LedgerIndex, StoreError};

use crate::config::ClientConfig;
use crate::error::{ClientError, SubmissionFailure};
use crate::events::{EventReporter, LedgerEvent, SkipReason};
use crate::session::SessionManager;
use crate::stats::MatchStats;
use crate::status::{StatusChannel, SubmissionPhase, TransactionStatus};

/// The record list as of one applied load.
#[derive(Debug, Clone, Default)]
pub struct RecordSnapshot {
    /// Generation of the load that produced this list; 0 before any load.
    pub generation: u64,
    /// Records, newest first.
    pub records: Arc<Vec<MatchRecord>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub generation: u64,
    pub loaded: usize,
    pub skipped: usize,
    /// False when a newer load had already been applied and this result was
    /// discarded.
    pub applied: bool,
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// Held for the whole of one submission; at most one exists at a time.
struct SubmitSlot<'a>(&'a AtomicBool);

impl<'a> SubmitSlot<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmitSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct LedgerSynchronizer {
    /// Read-only handle; writes go through the session's signing store.
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionManager>,
    config: ClientConfig,
    records: watch::Sender<RecordSnapshot>,
    next_generation: AtomicU64,
    in_flight: AtomicUsize,
    loaded: AtomicBool,
    submitting: AtomicBool,
    phase: watch::Sender<SubmissionPhase>,
    status: StatusChannel,
    events: EventReporter,
}

impl LedgerSynchronizer {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        session: Arc<SessionManager>,
        config: ClientConfig,
        events: EventReporter,
    ) -> Self {
        let status = StatusChannel::new(config.success_dismiss, config.error_dismiss);
        let (records, _) = watch::channel(RecordSnapshot::default());
        let (phase, _) = watch::channel(SubmissionPhase::Idle);
        Self {
            store,
            session,
            config,
            records,
            next_generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            loaded: AtomicBool::new(false),
            submitting: AtomicBool::new(false),
            phase,
            status,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // View accessors
    // -----------------------------------------------------------------------

    /// Current record list, newest first.
    pub fn records(&self) -> Arc<Vec<MatchRecord>> {
        self.records.borrow().records.clone()
    }

    pub fn subscribe_records(&self) -> watch::Receiver<RecordSnapshot> {
        self.records.subscribe()
    }

    pub fn stats(&self) -> MatchStats {
        MatchStats::from_records(&self.records())
    }

    /// Whether any load is running.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Whether at least one load has finished, successfully or not.
    pub fn has_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SubmissionPhase> {
        self.phase.subscribe()
    }

    pub fn status(&self) -> TransactionStatus {
        self.status.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TransactionStatus> {
        self.status.subscribe()
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Rebuild the record list from the ledger.
    ///
    /// On error the previous list is left untouched.
    pub async fn load_all(&self) -> Result<LoadReport, ClientError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.in_flight);

        let result = self.load_generation(generation).await;
        self.loaded.store(true, Ordering::SeqCst);
        result
    }

    async fn load_generation(&self, generation: u64) -> Result<LoadReport, ClientError> {
        match self.store.is_available().await {
            Ok(true) => {}
            Ok(false) | Err(StoreError::Unavailable) => {
                self.events.report(LedgerEvent::StoreUnavailable);
                return Err(ClientError::StoreUnavailable);
            }
            Err(e) => {
                self.events.report(LedgerEvent::LoadFailed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        }

        let snapshot = match LedgerIndex::new(self.store.clone()).read().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.events.report(LedgerEvent::LoadFailed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };
        if let Some(e) = &snapshot.recovered {
            self.events.report(LedgerEvent::IndexRecovered {
                reason: e.to_string(),
            });
        }

        let mut seen = HashSet::new();
        let keys: Vec<MatchId> = snapshot
            .keys
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let fetched: Vec<Option<MatchRecord>> = if self.config.parallel_fetch {
            futures::future::join_all(keys.iter().map(|id| self.fetch_record(id))).await
        } else {
            let mut fetched = Vec::with_capacity(keys.len());
            for id in &keys {
                fetched.push(self.fetch_record(id).await);
            }
            fetched
        };

        // Fetch results are in index order, so the stable sort keeps index
        // order among equal timestamps.
        let mut records: Vec<MatchRecord> = fetched.into_iter().flatten().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let loaded = records.len();
        let skipped = keys.len() - loaded;

        let applied = self.records.send_if_modified(|current| {
            if generation <= current.generation {
                return false;
            }
            *current = RecordSnapshot {
                generation,
                records: Arc::new(records),
            };
            true
        });

        if applied {
            debug!(generation, loaded, skipped, "Applied ledger load");
        } else {
            self.events
                .report(LedgerEvent::StaleLoadDiscarded { generation });
        }

        Ok(LoadReport {
            generation,
            loaded,
            skipped,
            applied,
        })
    }

    async fn fetch_record(&self, id: &MatchId) -> Option<MatchRecord> {
        let reason = match self.store.get(&id.record_key()).await {
            Ok(bytes) if bytes.is_empty() => SkipReason::Empty,
            Ok(bytes) => match decode_record(id, &bytes) {
                Ok(record) => return Some(record),
                Err(e) => SkipReason::Decode(e.to_string()),
            },
            Err(e) => SkipReason::Fetch(e.to_string()),
        };

        self.events.report(LedgerEvent::RecordSkipped {
            id: id.clone(),
            reason,
        });
        None
    }

    // -----------------------------------------------------------------------
    // Submit
    // -----------------------------------------------------------------------

    /// Seal `answers` into a new pending record owned by the active account,
    /// write it, index it and refresh the list.
    ///
    /// A call made while another submission is running fails with
    /// [`ClientError::SubmissionInProgress`] and leaves the phase and status
    /// of the running one untouched.
    pub async fn submit(&self, answers: &Questionnaire) -> Result<MatchId, ClientError> {
        let Some(_slot) = SubmitSlot::acquire(&self.submitting) else {
            debug!("Submission rejected, another one is running");
            return Err(ClientError::SubmissionInProgress);
        };

        if let Err(e) = answers.validate() {
            self.status.error(e.to_string());
            return Err(e.into());
        }

        // The owner is fixed here; later account switches do not apply.
        let Some(signer) = self.session.signer() else {
            self.status.error("Please connect wallet first");
            return Err(ClientError::NoSession);
        };

        self.phase.send_replace(SubmissionPhase::Encrypting);
        self.status.pending("Encrypting questionnaire with FHE...");

        let encrypted = cipher::seal(answers).map_err(|e| {
            self.fail(
                SubmissionPhase::Encrypting,
                SubmissionFailure::Other,
                e.to_string(),
            )
        })?;

        let now = Utc::now();
        let id = MatchId::generate(now);
        let record = MatchRecord::pending(id.clone(), encrypted, signer.owner.clone(), now.timestamp());
        let payload = encode_record(&record).map_err(|e| {
            self.fail(
                SubmissionPhase::Encrypting,
                SubmissionFailure::Other,
                e.to_string(),
            )
        })?;

        self.phase.send_replace(SubmissionPhase::WritingPayload);
        if let Err(e) = signer.store.set(&id.record_key(), Bytes::from(payload)).await {
            return Err(self.fail_store(SubmissionPhase::WritingPayload, e));
        }

        self.phase.send_replace(SubmissionPhase::AppendingIndex);
        if let Err(e) = LedgerIndex::new(signer.store.clone()).append(&id).await {
            self.events.report(LedgerEvent::OrphanedRecord {
                id: id.clone(),
                reason: e.to_string(),
            });
            return Err(self.fail_store(SubmissionPhase::AppendingIndex, e));
        }

        self.phase.send_replace(SubmissionPhase::Done);
        self.status.success("Encrypted questionnaire submitted!");
        self.events
            .report(LedgerEvent::RecordSubmitted { id: id.clone() });
        info!(id = %id, owner = %signer.owner, "Questionnaire submitted");

        if let Err(e) = self.load_all().await {
            debug!(error = %e, "Refresh after submission failed");
        }

        Ok(id)
    }

    fn fail_store(&self, stage: SubmissionPhase, e: StoreError) -> ClientError {
        if e.is_user_rejection() {
            self.fail(
                stage,
                SubmissionFailure::UserRejected,
                "Transaction rejected by user".to_string(),
            )
        } else {
            self.fail(stage, SubmissionFailure::Other, e.to_string())
        }
    }

    fn fail(&self, stage: SubmissionPhase, reason: SubmissionFailure, detail: String) -> ClientError {
        let message = match reason {
            SubmissionFailure::UserRejected => detail,
            SubmissionFailure::Other => format!("Submission failed: {detail}"),
        };
        self.phase.send_replace(SubmissionPhase::Failed);
        self.status.error(message.clone());
        ClientError::Submission {
            reason,
            stage,
            message,
        }
    }

    // -----------------------------------------------------------------------
    // Availability
    // -----------------------------------------------------------------------

    /// Ask the ledger whether it is reachable and publish the answer on the status channel.
    pub async fn check_availability(&self) -> Result<bool, ClientError> {
        match self.store.is_available().await {
            Ok(available) => {
                let state = if available { "available" } else { "not available" };
                self.status.success(format!("Ledger is {state}"));
                Ok(available)
            }
            Err(e) => {
                self.status.error(format!("Check failed: {e}"));
                Err(e.into())
            }
        }
    }
}
