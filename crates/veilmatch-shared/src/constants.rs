/// Application name
pub const APP_NAME: &str = "VeilMatch";

/// Ledger key holding the JSON list of every record id
pub const INDEX_KEY: &str = "match_keys";

/// Prefix joined with a record id to form the ledger key of its payload
pub const RECORD_KEY_PREFIX: &str = "match_";

/// Marker prepended to sealed questionnaire answers
pub const SEALED_PREFIX: &str = "FHE-";

/// Length of the random base36 suffix in generated record ids
pub const ID_SUFFIX_LEN: usize = 7;

/// Alphabet of the random id suffix
pub const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Upper bound of a compatibility score
pub const MAX_MATCH_PERCENTAGE: u8 = 100;

/// How long a success status stays visible (milliseconds)
pub const SUCCESS_DISMISS_MS: u64 = 2_000;

/// How long an error status stays visible (milliseconds)
pub const ERROR_DISMISS_MS: u64 = 3_000;
