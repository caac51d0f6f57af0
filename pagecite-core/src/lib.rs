//! Pagecite Core - citation anchoring for document question answering
//!
//! Ties together three pieces of state that evolve independently: the
//! document's load lifecycle, the running question/answer history, and the
//! viewer's focus (page and highlighted excerpt). Rendering and answer
//! generation are external engines reached through the traits in
//! [`engine`].

pub mod app;
pub mod config;
pub mod document_session;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod model;
pub mod pending;
pub mod query_session;
pub mod resolver;
pub mod viewer;

pub use app::{App, Citation};
pub use config::SessionConfig;
pub use document_session::{DocumentSession, LoadOutcome, LoadTicket};
pub use engine::{QaEngine, RenderedPage, RenderingEngine, StaticQaEngine};
pub use error::{
    AppError, EngineError, EvidenceError, InputError, NotReady, ParseError, QueryError, RenderError, ResolveError,
    ViewerError,
};
pub use input::DocumentSource;
pub use model::{
    Answer, DocumentContext, DocumentHandle, DocumentId, Evidence, Exchange, LoadState, ParsedDocument,
    ResolvedReference, SourceSpanHint, ViewerFocus,
};
pub use pending::{AnswerCompletion, LoadCompletion, PendingAnswer, PendingLoad};
pub use query_session::{QuerySession, QueryTicket, Settled, Submission};
pub use resolver::resolve;
pub use viewer::ViewerController;
