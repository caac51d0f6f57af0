use serde::{Deserialize, Serialize};

use super::DocumentId;

/// The viewer's current page and highlighted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerFocus {
    pub current_page: u32,
    pub highlight: String,
}

impl ViewerFocus {
    pub fn has_highlight(&self) -> bool {
        !self.highlight.is_empty()
    }
}

impl Default for ViewerFocus {
    fn default() -> Self {
        Self {
            current_page: 1,
            highlight: String::new(),
        }
    }
}

/// Evidence validated against the current document's bounds.
///
/// Only [`crate::resolver::resolve`] builds these, so a value in hand is
/// always safe to navigate to for the document it was resolved against, and
/// only for that document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReference {
    document_id: DocumentId,
    page_number: u32,
    highlight_text: String,
}

impl ResolvedReference {
    pub(crate) fn new(document_id: DocumentId, page_number: u32, highlight_text: String) -> Self {
        Self {
            document_id,
            page_number,
            highlight_text,
        }
    }

    /// Document whose bounds this reference was validated against
    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn highlight_text(&self) -> &str {
        &self.highlight_text
    }
}
