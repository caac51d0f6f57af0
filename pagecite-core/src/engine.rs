//! Boundaries to the external rendering and question-answering engines.
//!
//! The core never parses document bytes or ranks passages itself; it only
//! talks to these traits, so either side can be swapped or faked.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{EngineError, ParseError, RenderError};
use crate::model::{Answer, DocumentContext, DocumentHandle, ParsedDocument};

/// A rendered page, as produced by the rendering engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub page_number: u32,
    /// Engine-specific surface (bitmap, display list, ...)
    pub surface: Vec<u8>,
}

#[async_trait]
pub trait RenderingEngine: Send + Sync {
    /// Parse raw document bytes and report the page count
    async fn parse(&self, bytes: Arc<[u8]>) -> Result<ParsedDocument, ParseError>;

    fn render_page(&self, handle: &DocumentHandle, page: u32) -> Result<RenderedPage, RenderError>;

    /// Reclaim whatever the engine holds for a document that was replaced
    fn release(&self, _handle: &DocumentHandle) {}
}

#[async_trait]
pub trait QaEngine: Send + Sync {
    /// Answer `question` about the document in `context`, best answer first
    async fn ask(&self, question: &str, context: &DocumentContext) -> Result<Vec<Answer>, EngineError>;
}

/// Answers every question with the same fixed list.
///
/// Useful for demos and for exercising the anchoring layer without a real
/// retrieval backend.
#[derive(Debug, Clone, Default)]
pub struct StaticQaEngine {
    answers: Vec<Answer>,
}

impl StaticQaEngine {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }
}

#[async_trait]
impl QaEngine for StaticQaEngine {
    async fn ask(&self, _question: &str, _context: &DocumentContext) -> Result<Vec<Answer>, EngineError> {
        Ok(self.answers.clone())
    }
}
