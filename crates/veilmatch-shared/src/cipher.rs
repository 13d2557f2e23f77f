//! Simulated sealing of questionnaire answers.
//!
//! Sealed data is `FHE-` followed by the base64 of the answers' JSON. It is
//! reversible and offers no confidentiality; a real scheme can replace
//! [`seal`] and [`open`] without changing the record layout.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::constants::SEALED_PREFIX;
use crate::error::CipherError;
use crate::questionnaire::Questionnaire;

pub fn seal(answers: &Questionnaire) -> Result<String, CipherError> {
    let json = serde_json::to_vec(answers).map_err(|e| CipherError::Seal(e.to_string()))?;
    Ok(format!("{SEALED_PREFIX}{}", STANDARD.encode(json)))
}

pub fn open(sealed: &str) -> Result<Questionnaire, CipherError> {
    let body = sealed
        .strip_prefix(SEALED_PREFIX)
        .ok_or(CipherError::MissingPrefix)?;
    let json = STANDARD.decode(body)?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let mut answers = Questionnaire::new("curious", "honesty");
        answers.hobbies = "climbing, chess".to_string();

        let sealed = seal(&answers).unwrap();
        assert!(sealed.starts_with(SEALED_PREFIX));
        assert!(!sealed.contains("honesty"));
        assert_eq!(open(&sealed).unwrap(), answers);
    }

    #[test]
    fn test_open_rejects_foreign_data() {
        assert!(matches!(open("plain"), Err(CipherError::MissingPrefix)));
        assert!(matches!(open("FHE-%%%"), Err(CipherError::Base64(_))));
        // "bm90IGpzb24=" is base64 of "not json"
        assert!(matches!(open("FHE-bm90IGpzb24="), Err(CipherError::Payload(_))));
    }
}
