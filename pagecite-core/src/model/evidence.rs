use serde::{Deserialize, Serialize};

use crate::error::EvidenceError;

/// Opaque locator the QA engine attaches to an excerpt.
///
/// The core never interprets it beyond producing a display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpanHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<u32>,
}

impl SourceSpanHint {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            paragraph: None,
        }
    }
}

/// A claim that an excerpt on a page supports an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEvidence")]
pub struct Evidence {
    excerpt_text: String,
    page_number: u32,
    source_span_hint: SourceSpanHint,
}

impl Evidence {
    /// Build an evidence record. The page number is not checked here; bounds
    /// are only known once it is resolved against a document.
    pub fn new(excerpt_text: impl Into<String>, page_number: u32) -> Result<Self, EvidenceError> {
        let excerpt_text = excerpt_text.into();
        if excerpt_text.is_empty() {
            return Err(EvidenceError::EmptyExcerpt);
        }
        Ok(Self {
            excerpt_text,
            page_number,
            source_span_hint: SourceSpanHint::default(),
        })
    }

    pub fn with_hint(mut self, hint: SourceSpanHint) -> Self {
        self.source_span_hint = hint;
        self
    }

    pub fn excerpt_text(&self) -> &str {
        &self.excerpt_text
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn source_span_hint(&self) -> &SourceSpanHint {
        &self.source_span_hint
    }

    /// Label shown on the citation link
    pub fn citation_label(&self) -> String {
        match (&self.source_span_hint.label, self.source_span_hint.paragraph) {
            (Some(label), _) => label.clone(),
            (None, Some(paragraph)) => format!("Page {}, paragraph {}", self.page_number, paragraph),
            (None, None) => format!("Page {}", self.page_number),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvidence {
    excerpt_text: String,
    page_number: u32,
    #[serde(default)]
    source_span_hint: SourceSpanHint,
}

impl TryFrom<RawEvidence> for Evidence {
    type Error = EvidenceError;

    fn try_from(raw: RawEvidence) -> Result<Self, Self::Error> {
        Ok(Evidence::new(raw.excerpt_text, raw.page_number)?.with_hint(raw.source_span_hint))
    }
}
