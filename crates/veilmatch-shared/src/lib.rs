//! # veilmatch-shared
//!
//! Types and encodings shared by the VeilMatch store and client crates:
//! the match record model, its ledger byte encoding, the questionnaire and
//! the simulated sealing of its answers.

pub mod cipher;
pub mod codec;
pub mod constants;
pub mod error;
pub mod questionnaire;
pub mod record;
pub mod types;

pub use error::{CipherError, CodecError, QuestionnaireError};
pub use questionnaire::Questionnaire;
pub use record::MatchRecord;
pub use types::{Address, MatchId, MatchStatus};
