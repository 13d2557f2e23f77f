use serde::Serialize;

use crate::types::{Address, MatchId, MatchStatus};

/// One questionnaire submission as it lives on the ledger.
///
/// Only the external matcher changes `status`, `match_percentage` and
/// `partner_address`; the client writes a record once, at submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Key suffix under which the payload is stored.
    pub id: MatchId,
    /// Sealed questionnaire answers (see [`crate::cipher`]).
    pub encrypted_data: String,
    /// Creation time, seconds since the Unix epoch.
    pub timestamp: i64,
    /// Account that submitted the questionnaire.
    pub owner: Address,
    pub status: MatchStatus,
    /// Compatibility score, 0 to 100.
    pub match_percentage: u8,
    /// Empty until the matcher assigns a partner.
    pub partner_address: Address,
}

impl MatchRecord {
    /// A freshly submitted record awaiting the matcher.
    pub fn pending(id: MatchId, encrypted_data: String, owner: Address, timestamp: i64) -> Self {
        Self {
            id,
            encrypted_data,
            timestamp,
            owner,
            status: MatchStatus::Pending,
            match_percentage: 0,
            partner_address: Address::default(),
        }
    }
}
