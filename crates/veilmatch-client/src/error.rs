use serde::Serialize;
use thiserror::Error;

use veilmatch_shared::QuestionnaireError;
use veilmatch_store::StoreError;

use crate::status::SubmissionPhase;

/// Failures reported by a wallet transport.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Account access denied by user")]
    AccessDenied,
}

/// Why a submission write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionFailure {
    /// The user declined the wallet's authorization prompt.
    UserRejected,
    Other,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Wallet connection failed: {0}")]
    Connection(String),

    #[error("No wallet connected")]
    NoSession,

    #[error("Invalid questionnaire: {0}")]
    InvalidQuestionnaire(#[from] QuestionnaireError),

    #[error("Ledger store is unavailable")]
    StoreUnavailable,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// A submission failed at `stage`. When `stage` is
    /// [`SubmissionPhase::AppendingIndex`] the payload was written but is not
    /// referenced by the index.
    #[error("{message}")]
    Submission {
        reason: SubmissionFailure,
        stage: SubmissionPhase,
        message: String,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<WalletError> for ClientError {
    fn from(e: WalletError) -> Self {
        ClientError::Connection(e.to_string())
    }
}
