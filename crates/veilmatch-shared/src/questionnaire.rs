//! Questionnaire answers collected before a record is created.

use serde::{Deserialize, Serialize};

use crate::error::QuestionnaireError;

/// Free-text answers to the matching questionnaire.
///
/// `personality` and `values` are required; the rest may be left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Questionnaire {
    pub personality: String,
    pub hobbies: String,
    pub values: String,
    pub lifestyle: String,
    pub dealbreakers: String,
}

impl Questionnaire {
    /// Answers with only the two required fields filled.
    pub fn new(personality: impl Into<String>, values: impl Into<String>) -> Self {
        Self {
            personality: personality.into(),
            values: values.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), QuestionnaireError> {
        if self.personality.trim().is_empty() {
            return Err(QuestionnaireError::MissingAnswer("personality"));
        }
        if self.values.trim().is_empty() {
            return Err(QuestionnaireError::MissingAnswer("values"));
        }
        Ok(())
    }
}
