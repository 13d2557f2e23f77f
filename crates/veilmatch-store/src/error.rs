use thiserror::Error;

use veilmatch_shared::CodecError;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The ledger contract reported itself unavailable or
    /// could not be reached at all.
    #[error("Ledger store is unavailable")]
    Unavailable,

    /// The wallet owner declined to authorize the write.
    #[error("Write rejected by user")]
    Rejected,

    /// Any other failure reported by the transport (RPC error, reverted
    /// transaction, lost connection).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A value could not be encoded for writing.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl StoreError {
    /// Whether the failure came from the user declining the authorization
    /// prompt rather than from the ledger itself.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            StoreError::Rejected => true,
            StoreError::Transport(msg) => msg.to_ascii_lowercase().contains("user rejected"),
            _ => false,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
