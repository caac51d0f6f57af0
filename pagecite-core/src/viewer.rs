//! Viewer focus state machine.
//!
//! The only place [`ViewerFocus`] changes. Transitions come from document
//! lifecycle events and citation selection; nothing else moves the viewer.

use tracing::debug;

use crate::error::ViewerError;
use crate::logging::loggable;
use crate::model::{DocumentId, ResolvedReference, ViewerFocus};

pub struct ViewerController {
    focus: ViewerFocus,
    // Some only while a document is Ready
    document: Option<(DocumentId, u32)>,
}

impl ViewerController {
    pub fn new() -> Self {
        Self {
            focus: ViewerFocus::default(),
            document: None,
        }
    }

    /// Clear focus when a new document begins loading, so no highlight from
    /// the old document survives into the new one.
    pub fn on_load_started(&mut self) {
        self.focus = ViewerFocus::default();
        self.document = None;
    }

    pub fn on_document_ready(&mut self, document: DocumentId, page_count: u32) {
        self.focus = ViewerFocus::default();
        self.document = Some((document, page_count));
        debug!(pages = page_count, "viewer reset to first page");
    }

    /// Move to the cited page and highlight its excerpt. Idempotent.
    pub fn on_reference_selected(&mut self, reference: &ResolvedReference) -> Result<&ViewerFocus, ViewerError> {
        let (document, page_count) = self.document.ok_or(ViewerError::NotReady)?;
        if reference.document_id() != document {
            return Err(ViewerError::StaleReference);
        }
        let page = reference.page_number();
        if page == 0 || page > page_count {
            return Err(ViewerError::OutOfRange { page, page_count });
        }

        self.focus = ViewerFocus {
            current_page: page,
            highlight: reference.highlight_text().to_string(),
        };
        debug!(page, highlight = %loggable(&self.focus.highlight), "viewer focused on citation");
        Ok(&self.focus)
    }

    pub fn current_focus(&self) -> &ViewerFocus {
        &self.focus
    }

    pub fn is_active(&self) -> bool {
        self.document.is_some()
    }
}

impl Default for ViewerController {
    fn default() -> Self {
        Self::new()
    }
}
