use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DocumentId = Uuid;

/// Load lifecycle of the current document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Unloaded => "unloaded",
            LoadState::Loading => "loading",
            LoadState::Ready => "ready",
            LoadState::Failed => "failed",
        }
    }
}

/// What the rendering engine reports after a successful parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDocument {
    pub page_count: u32,
}

impl ParsedDocument {
    pub fn new(page_count: u32) -> Self {
        Self { page_count }
    }
}

/// The single live document.
///
/// Only exists once a load has completed, so `page_count` is always known
/// and always at least 1.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    id: DocumentId,
    epoch: u64,
    name: Option<String>,
    page_count: u32,
    bytes: Arc<[u8]>,
}

impl DocumentHandle {
    pub(crate) fn new(epoch: u64, name: Option<String>, page_count: u32, bytes: Arc<[u8]>) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            name,
            page_count,
            bytes,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Load generation this handle belongs to
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Context handed to the question-answering engine
    pub fn context(&self) -> DocumentContext {
        DocumentContext {
            document_id: self.id,
            name: self.name.clone(),
            page_count: self.page_count,
            bytes: Arc::clone(&self.bytes),
        }
    }
}

/// Read-only view of the ready document, shared with the QA engine
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub document_id: DocumentId,
    pub name: Option<String>,
    pub page_count: u32,
    pub bytes: Arc<[u8]>,
}
