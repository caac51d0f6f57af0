use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Evidence;
use crate::error::EngineError;

/// One answer returned by the QA engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub text: String,
    pub evidence: Evidence,
}

impl Answer {
    pub fn new(text: impl Into<String>, evidence: Evidence) -> Self {
        Self {
            text: text.into(),
            evidence,
        }
    }
}

/// A question and its full set of answers.
///
/// Immutable once built; only the query session constructs these.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    id: Uuid,
    question: String,
    answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    asked_at: DateTime<Utc>,
}

impl Exchange {
    pub(crate) fn answered(question: String, answers: Vec<Answer>, asked_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question,
            answers,
            error: None,
            asked_at,
        }
    }

    pub(crate) fn failed(question: String, error: &EngineError, asked_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question,
            answers: Vec::new(),
            error: Some(error.to_string()),
            asked_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Engine failure message, if the question could not be answered
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn asked_at(&self) -> DateTime<Utc> {
        self.asked_at
    }
}
