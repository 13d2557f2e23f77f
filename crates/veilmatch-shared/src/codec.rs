//! Byte encoding of ledger values.
//!
//! Record payloads are UTF-8 JSON objects of the form
//! `{"data", "timestamp", "owner", "status", "matchPercentage", "partnerAddress"}`.
//! The record id is not part of the payload; it is the suffix of the key
//! the payload is stored under. The index is a JSON array of id strings.
//!
//! This layout is shared with every client that ever wrote to the ledger,
//! so it must only grow in backward-compatible ways.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_MATCH_PERCENTAGE;
use crate::error::CodecError;
use crate::record::MatchRecord;
use crate::types::{Address, MatchId, MatchStatus};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PayloadRef<'a> {
    data: &'a str,
    timestamp: i64,
    owner: &'a str,
    status: MatchStatus,
    match_percentage: u8,
    partner_address: &'a str,
}

// Missing or null optional fields fall back to their defaults.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadOwned {
    data: String,
    timestamp: i64,
    owner: String,
    status: Option<String>,
    match_percentage: Option<u64>,
    partner_address: Option<String>,
}

pub fn encode_record(record: &MatchRecord) -> Result<Vec<u8>, CodecError> {
    let payload = PayloadRef {
        data: &record.encrypted_data,
        timestamp: record.timestamp,
        owner: record.owner.as_str(),
        status: record.status,
        match_percentage: record.match_percentage,
        partner_address: record.partner_address.as_str(),
    };
    Ok(serde_json::to_vec(&payload)?)
}

/// Decode the payload stored under `id`'s record key.
pub fn decode_record(id: &MatchId, bytes: &[u8]) -> Result<MatchRecord, CodecError> {
    let text = std::str::from_utf8(bytes)?;
    let payload: PayloadOwned = serde_json::from_str(text)?;

    let status = match payload.status.as_deref() {
        None | Some("") | Some("pending") => MatchStatus::Pending,
        Some("matched") => MatchStatus::Matched,
        Some("rejected") => MatchStatus::Rejected,
        Some(other) => {
            return Err(CodecError::InvalidField {
                field: "status",
                reason: format!("unknown status `{other}`"),
            })
        }
    };

    let match_percentage = match payload.match_percentage.unwrap_or(0) {
        p if p <= u64::from(MAX_MATCH_PERCENTAGE) => p as u8,
        p => {
            return Err(CodecError::InvalidField {
                field: "matchPercentage",
                reason: format!("{p} exceeds {MAX_MATCH_PERCENTAGE}"),
            })
        }
    };

    Ok(MatchRecord {
        id: id.clone(),
        encrypted_data: payload.data,
        timestamp: payload.timestamp,
        owner: Address(payload.owner),
        status,
        match_percentage,
        partner_address: Address(payload.partner_address.unwrap_or_default()),
    })
}

pub fn encode_key_list(keys: &[MatchId]) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(keys)?)
}

pub fn decode_key_list(bytes: &[u8]) -> Result<Vec<MatchId>, CodecError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(serde_json::from_str(text)?)
}
