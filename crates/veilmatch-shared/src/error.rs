use thiserror::Error;

/// A ledger payload that could not be turned back into a value.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Sealed data is missing the expected prefix")]
    MissingPrefix,

    #[error("Sealed data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Sealed data does not hold questionnaire answers: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Answers could not be sealed: {0}")]
    Seal(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuestionnaireError {
    #[error("Missing required answer: {0}")]
    MissingAnswer(&'static str),
}
