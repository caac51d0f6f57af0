#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pagecite_core::{
    Answer, DocumentContext, DocumentHandle, DocumentSource, EngineError, Evidence, ParseError, ParsedDocument,
    QaEngine, RenderError, RenderedPage, RenderingEngine,
};

/// Minimal PDF-looking bytes; the fake renderer reads `pages=` and
/// `delay_ms=` directives from them.
pub fn fake_pdf(name: &str, pages: u32) -> DocumentSource {
    DocumentSource::from_bytes(name, format!("%PDF-1.7 pages={}", pages).into_bytes()).unwrap()
}

pub fn slow_pdf(name: &str, pages: u32, delay_ms: u64) -> DocumentSource {
    DocumentSource::from_bytes(name, format!("%PDF-1.7 pages={} delay_ms={}", pages, delay_ms).into_bytes())
        .unwrap()
}

pub fn broken_pdf(name: &str) -> DocumentSource {
    DocumentSource::from_bytes(name, b"%PDF-1.7 truncated".to_vec()).unwrap()
}

fn directive(text: &str, key: &str) -> Option<u64> {
    text.split_whitespace()
        .find_map(|part| part.strip_prefix(key))
        .and_then(|value| value.parse().ok())
}

#[derive(Default)]
pub struct FakeRenderer {
    pub released: AtomicUsize,
}

impl FakeRenderer {
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderingEngine for FakeRenderer {
    async fn parse(&self, bytes: Arc<[u8]>) -> Result<ParsedDocument, ParseError> {
        let text = String::from_utf8_lossy(&bytes).to_string();
        if let Some(delay) = directive(&text, "delay_ms=") {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let pages = directive(&text, "pages=").ok_or_else(|| ParseError::Malformed("missing page tree".into()))?;
        Ok(ParsedDocument::new(pages as u32))
    }

    fn render_page(&self, handle: &DocumentHandle, page: u32) -> Result<RenderedPage, RenderError> {
        Ok(RenderedPage {
            page_number: page,
            surface: format!("{}#{}", handle.id(), page).into_bytes(),
        })
    }

    fn release(&self, _handle: &DocumentHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Answers chosen per question, each with its own latency
#[derive(Default)]
pub struct ScriptedEngine {
    scripts: HashMap<String, (Duration, Result<Vec<Answer>, EngineError>)>,
}

impl ScriptedEngine {
    pub fn answer(mut self, question: &str, delay_ms: u64, answers: Vec<Answer>) -> Self {
        self.scripts
            .insert(question.to_string(), (Duration::from_millis(delay_ms), Ok(answers)));
        self
    }

    pub fn fail(mut self, question: &str, delay_ms: u64, error: EngineError) -> Self {
        self.scripts
            .insert(question.to_string(), (Duration::from_millis(delay_ms), Err(error)));
        self
    }
}

#[async_trait]
impl QaEngine for ScriptedEngine {
    async fn ask(&self, question: &str, _context: &DocumentContext) -> Result<Vec<Answer>, EngineError> {
        match self.scripts.get(question) {
            Some((delay, result)) => {
                tokio::time::sleep(*delay).await;
                result.clone()
            }
            None => Ok(Vec::new()),
        }
    }
}

pub fn cited(text: &str, excerpt: &str, page: u32) -> Answer {
    Answer::new(text, Evidence::new(excerpt, page).unwrap())
}
