use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::config::SessionConfig;
use crate::document_session::{DocumentSession, LoadOutcome};
use crate::engine::{QaEngine, RenderedPage, RenderingEngine};
use crate::error::{AppError, NotReady, QueryError, RenderError, ViewerError};
use crate::input::DocumentSource;
use crate::model::{Answer, DocumentHandle, DocumentId, Exchange, LoadState, ResolvedReference, ViewerFocus};
use crate::pending::{AnswerCompletion, LoadCompletion, PendingAnswer, PendingLoad};
use crate::query_session::{QuerySession, QueryTicket, Settled};
use crate::resolver;
use crate::viewer::ViewerController;

/// An answer together with its navigable citation, if it has one
#[derive(Debug, Clone)]
pub struct Citation<'a> {
    pub answer: &'a Answer,
    pub label: String,
    /// `None` when the evidence points outside the document; the answer text
    /// is still shown but offers no navigation
    pub reference: Option<ResolvedReference>,
}

/// Platform-agnostic session state.
///
/// Wires the document session, query session and viewer together. Each
/// component only sees the events addressed to it; `App` is the single
/// event-processing path, so no locking is needed.
pub struct App {
    document: DocumentSession,
    queries: QuerySession,
    viewer: ViewerController,
    renderer: Arc<dyn RenderingEngine>,
    engine: Arc<dyn QaEngine>,
    config: SessionConfig,

    // Tickets of pending answers dropped without being awaited
    abandoned_tx: mpsc::UnboundedSender<QueryTicket>,
    abandoned_rx: mpsc::UnboundedReceiver<QueryTicket>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    pub fn new(renderer: Arc<dyn RenderingEngine>, engine: Arc<dyn QaEngine>) -> Self {
        Self::with_config(renderer, engine, SessionConfig::default())
    }

    pub fn with_config(
        renderer: Arc<dyn RenderingEngine>,
        engine: Arc<dyn QaEngine>,
        config: SessionConfig,
    ) -> Self {
        let (abandoned_tx, abandoned_rx) = mpsc::unbounded_channel();
        Self {
            document: DocumentSession::new(),
            queries: QuerySession::new(&config),
            viewer: ViewerController::new(),
            renderer,
            engine,
            config,
            abandoned_tx,
            abandoned_rx,
            status_message: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start loading `source`.
    ///
    /// Focus and submissions are reset immediately; anything still in flight
    /// for the previous document is orphaned. The returned future must be
    /// awaited and its completion passed to [`App::apply_load`].
    #[instrument(skip_all, fields(name = source.name().unwrap_or("<unnamed>")))]
    pub fn load_document(&mut self, source: DocumentSource) -> PendingLoad {
        self.reap_abandoned();
        let (name, bytes) = source.into_parts();
        let (ticket, previous) = self.document.begin_load(name, Arc::clone(&bytes));
        if let Some(previous) = previous {
            self.renderer.release(&previous);
        }
        self.viewer.on_load_started();
        self.queries.on_load_started(ticket.epoch);
        self.set_status("Loading document...");

        let renderer = Arc::clone(&self.renderer);
        let future = async move { renderer.parse(bytes).await }.boxed();
        PendingLoad::new(ticket, self.config.load_timeout(), future)
    }

    /// Apply a parse completion. Completions for superseded loads are
    /// discarded and reported as [`LoadOutcome::Stale`].
    pub fn apply_load(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let outcome = self.document.complete_load(completion.ticket, completion.result);
        match &outcome {
            LoadOutcome::Ready(handle) => {
                self.viewer.on_document_ready(handle.id(), handle.page_count());
                self.queries.on_document_ready(handle.context());
                let msg = format!("Loaded {} ({} pages)", display_name(handle), handle.page_count());
                self.set_status(&msg);
            }
            LoadOutcome::Failed(err) => {
                let msg = format!("Could not load document: {}", err);
                self.set_status(&msg);
            }
            LoadOutcome::Stale => {}
        }
        outcome
    }

    /// Load and wait for the parse in one step
    pub async fn load_and_wait(&mut self, source: DocumentSource) -> LoadOutcome {
        let pending = self.load_document(source);
        let completion = pending.wait().await;
        self.apply_load(completion)
    }

    /// Submit a question about the ready document.
    ///
    /// Rejected synchronously when no document is ready. The returned
    /// future must be awaited and its completion passed to
    /// [`App::apply_answer`]; answers are committed in submission order no
    /// matter which completion is applied first.
    pub fn submit_question(&mut self, text: &str) -> Result<PendingAnswer, QueryError> {
        self.reap_abandoned();
        let submission = match self.queries.submit(text) {
            Ok(submission) => submission,
            Err(err) => {
                self.set_status(AppError::from(err.clone()).user_message());
                return Err(err);
            }
        };

        let engine = Arc::clone(&self.engine);
        let question = submission.question;
        let context = submission.context;
        let future = async move { engine.ask(&question, &context).await }.boxed();
        Ok(PendingAnswer::new(
            submission.ticket,
            self.config.answer_timeout(),
            future,
            self.abandoned_tx.clone(),
        ))
    }

    /// Apply a QA engine completion
    pub fn apply_answer(&mut self, completion: AnswerCompletion) -> Settled {
        self.reap_abandoned();
        let settled = self.queries.settle(completion.ticket, completion.result);
        self.report_failures(settled);
        settled
    }

    /// Give up on a question. Its slot is filled with an error exchange so
    /// later answers are not held back.
    pub fn abandon_question(&mut self, ticket: QueryTicket) -> Settled {
        let settled = self.queries.abandon(ticket);
        self.report_failures(settled);
        settled
    }

    /// Settle every question whose [`PendingAnswer`] was dropped unawaited.
    /// Returns how many were reaped.
    pub fn reap_abandoned(&mut self) -> usize {
        let mut reaped = 0;
        while let Ok(ticket) = self.abandoned_rx.try_recv() {
            debug!(seq = ticket.seq, "pending answer dropped before completion");
            self.abandon_question(ticket);
            reaped += 1;
        }
        reaped
    }

    fn report_failures(&mut self, settled: Settled) {
        if let Settled::Committed(n) = settled {
            let history = self.history();
            let failure = history[history.len() - n..]
                .iter()
                .rev()
                .find_map(Exchange::error)
                .map(|err| format!("Could not answer: {}", err));
            if let Some(msg) = failure {
                self.set_status(&msg);
            }
        }
    }

    /// Submit a question and wait for its answer in one step
    #[instrument(skip_all)]
    pub async fn ask(&mut self, text: &str) -> Result<Settled, QueryError> {
        let pending = self.submit_question(text)?;
        let completion = pending.wait().await;
        Ok(self.apply_answer(completion))
    }

    /// Whether the send action should be enabled
    pub fn can_submit(&self) -> bool {
        self.queries.accepts_questions()
    }

    pub fn history(&self) -> &[Exchange] {
        self.queries.history()
    }

    pub fn pending_questions(&self) -> usize {
        self.queries.pending_count()
    }

    /// Every answer of an exchange, with citations resolved against the
    /// current document
    pub fn citations(&self, exchange: usize) -> Result<Vec<Citation<'_>>, AppError> {
        let exchange = self
            .history()
            .get(exchange)
            .ok_or(AppError::NoSuchExchange(exchange))?;
        let bounds = self.ready_bounds().ok();

        Ok(exchange
            .answers()
            .iter()
            .map(|answer| {
                let reference = bounds.and_then(|(document, pages)| {
                    match resolver::resolve(&answer.evidence, document, pages) {
                        Ok(reference) => Some(reference),
                        Err(err) => {
                            debug!(error = %err, "citation not offered for navigation");
                            None
                        }
                    }
                });
                Citation {
                    answer,
                    label: answer.evidence.citation_label(),
                    reference,
                }
            })
            .collect())
    }

    /// Resolve one answer's evidence and move the viewer to it
    pub fn select_citation(&mut self, exchange: usize, answer: usize) -> Result<&ViewerFocus, AppError> {
        let (document, page_count) = self.ready_bounds().map_err(|NotReady| ViewerError::NotReady)?;
        let evidence = self
            .history()
            .get(exchange)
            .ok_or(AppError::NoSuchExchange(exchange))?
            .answers()
            .get(answer)
            .ok_or(AppError::NoSuchAnswer { exchange, answer })?
            .evidence
            .clone();

        let reference = resolver::resolve(&evidence, document, page_count)?;
        self.select_reference(&reference)
    }

    /// Move the viewer to an already-resolved reference
    pub fn select_reference(&mut self, reference: &ResolvedReference) -> Result<&ViewerFocus, AppError> {
        self.viewer.on_reference_selected(reference)?;
        info!(page = reference.page_number(), "navigated to citation");
        let msg = format!("Page {}", reference.page_number());
        self.set_status(&msg);
        Ok(self.viewer.current_focus())
    }

    // Live document id and page count, once Ready
    fn ready_bounds(&self) -> Result<(DocumentId, u32), NotReady> {
        let page_count = self.document.current_page_count()?;
        let handle = self.document.handle().ok_or(NotReady)?;
        Ok((handle.id(), page_count))
    }

    pub fn current_focus(&self) -> &ViewerFocus {
        self.viewer.current_focus()
    }

    pub fn load_state(&self) -> LoadState {
        self.document.state()
    }

    pub fn page_count(&self) -> Result<u32, NotReady> {
        self.document.current_page_count()
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.handle()
    }

    /// Render the page the viewer is focused on
    pub fn render_current_page(&self) -> Result<RenderedPage, RenderError> {
        let handle = self.document.handle().ok_or(RenderError::NotReady)?;
        if !self.document.is_ready() {
            return Err(RenderError::NotReady);
        }
        let page = self.viewer.current_focus().current_page;
        if page > handle.page_count() {
            return Err(RenderError::PageOutOfRange {
                page,
                page_count: handle.page_count(),
            });
        }
        self.renderer.render_page(handle, page)
    }

    /// Set status message
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Get title for display
    pub fn title(&self) -> String {
        self.document
            .handle()
            .and_then(|d| d.name().map(str::to_string))
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

fn display_name(handle: &DocumentHandle) -> &str {
    handle.name().unwrap_or("document")
}
