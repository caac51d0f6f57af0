//! Error taxonomy for the anchoring layer.
//!
//! Every error is recovered at the component that detects it and turned into
//! explicit state (a `Failed` load, an error-flavoured exchange, a citation
//! that is not offered for navigation). None of them is fatal.

use std::time::Duration;

use thiserror::Error;

/// The rendering engine could not turn the input into a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document could not be parsed: {0}")]
    Malformed(String),

    #[error("document has no pages")]
    NoPages,

    #[error("document parsing timed out after {0:?}")]
    Timeout(Duration),

    #[error("document parsing was interrupted")]
    Interrupted,
}

/// A page could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no document is ready to render")]
    NotReady,

    #[error("page {page} is outside the document (1..={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("rendering failed: {0}")]
    Engine(String),
}

/// The question-answering engine failed to produce answers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("answer engine failed: {0}")]
    Failed(String),

    #[error("answer engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("question was abandoned before an answer arrived")]
    Cancelled,
}

/// An evidence record could not be turned into a navigable reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("cited page {page} is outside the document (1..={page_count})")]
    OutOfRange { page: u32, page_count: u32 },
}

/// An evidence record was malformed at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvidenceError {
    #[error("evidence excerpt must not be empty")]
    EmptyExcerpt,
}

/// A question could not be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no document is ready; load a document before asking questions")]
    NoDocument,

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("question is {len} characters long; the limit is {max}")]
    QuestionTooLong { len: usize, max: usize },
}

/// The viewer rejected a focus transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("viewer has no ready document")]
    NotReady,

    #[error("reference was resolved against a different document")]
    StaleReference,

    #[error("page {page} is outside the document (1..={page_count})")]
    OutOfRange { page: u32, page_count: u32 },
}

/// The document session was asked for data it does not have yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("document is not ready")]
pub struct NotReady;

/// A candidate input was rejected before reaching the document session.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unsupported file type `{0}`; only .pdf documents are accepted")]
    UnsupportedExtension(String),

    #[error("unsupported media type `{0}`; expected application/pdf")]
    UnsupportedMediaType(String),

    #[error("document is empty")]
    Empty,

    #[error("content does not look like a PDF document")]
    NotPdf,

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by [`crate::App`] operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Viewer(#[from] ViewerError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("no exchange at index {0}")]
    NoSuchExchange(usize),

    #[error("exchange {exchange} has no answer at index {answer}")]
    NoSuchAnswer { exchange: usize, answer: usize },
}

impl AppError {
    /// Short message suitable for a status line.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Query(QueryError::NoDocument) => "Load a document before asking a question",
            Self::Query(QueryError::EmptyQuestion) => "Type a question first",
            Self::Query(QueryError::QuestionTooLong { .. }) => "Question is too long",
            Self::Resolve(_) => "That citation points outside the document",
            Self::Viewer(ViewerError::StaleReference) => "That citation belongs to a previous document",
            Self::Viewer(_) | Self::Render(_) => "The document is not ready",
            Self::NoSuchExchange(_) | Self::NoSuchAnswer { .. } => "That answer is no longer available",
        }
    }
}
