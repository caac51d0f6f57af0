//! Explicit completion signals for work that suspends on an external engine.
//!
//! Starting a load or a question does the synchronous state transition
//! immediately and hands back one of these. Awaiting it yields a completion
//! tagged with the ticket it belongs to, which the [`crate::App`] checks for
//! staleness before applying.

use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::mpsc::UnboundedSender;

use crate::document_session::LoadTicket;
use crate::error::{EngineError, ParseError};
use crate::model::{Answer, ParsedDocument};
use crate::query_session::QueryTicket;

/// Rendering engine result for one load request
#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub result: Result<ParsedDocument, ParseError>,
}

/// QA engine result for one question
#[derive(Debug)]
pub struct AnswerCompletion {
    pub ticket: QueryTicket,
    pub result: Result<Vec<Answer>, EngineError>,
}

#[must_use = "a pending load does nothing until awaited and applied"]
pub struct PendingLoad {
    ticket: LoadTicket,
    timeout: Duration,
    future: BoxFuture<'static, Result<ParsedDocument, ParseError>>,
}

impl PendingLoad {
    pub(crate) fn new(
        ticket: LoadTicket,
        timeout: Duration,
        future: BoxFuture<'static, Result<ParsedDocument, ParseError>>,
    ) -> Self {
        Self { ticket, timeout, future }
    }

    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Drive the parse to completion, bounded by the load timeout
    pub async fn wait(self) -> LoadCompletion {
        let result = match tokio::time::timeout(self.timeout, self.future).await {
            Ok(result) => result,
            Err(_) => Err(ParseError::Timeout(self.timeout)),
        };
        LoadCompletion {
            ticket: self.ticket,
            result,
        }
    }
}

type AnswerFuture = BoxFuture<'static, Result<Vec<Answer>, EngineError>>;

/// A question in flight.
///
/// Dropping it before [`PendingAnswer::wait`] finishes reports the ticket
/// back to the [`crate::App`], which settles it as
/// [`EngineError::Cancelled`] so later answers are not held back.
#[must_use = "a pending answer does nothing until awaited and applied"]
pub struct PendingAnswer {
    ticket: QueryTicket,
    timeout: Duration,
    future: Option<AnswerFuture>,
    on_drop: Option<UnboundedSender<QueryTicket>>,
}

impl PendingAnswer {
    pub(crate) fn new(
        ticket: QueryTicket,
        timeout: Duration,
        future: AnswerFuture,
        on_drop: UnboundedSender<QueryTicket>,
    ) -> Self {
        Self {
            ticket,
            timeout,
            future: Some(future),
            on_drop: Some(on_drop),
        }
    }

    pub fn ticket(&self) -> QueryTicket {
        self.ticket
    }

    /// Drive the engine call to completion, bounded by the answer timeout
    pub async fn wait(mut self) -> AnswerCompletion {
        let result = match self.future.take() {
            Some(future) => match tokio::time::timeout(self.timeout, future).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::Timeout(self.timeout)),
            },
            None => Err(EngineError::Cancelled),
        };
        // The completion now carries the ticket
        self.on_drop = None;
        AnswerCompletion {
            ticket: self.ticket,
            result,
        }
    }
}

impl Drop for PendingAnswer {
    fn drop(&mut self) {
        if let Some(tx) = self.on_drop.take() {
            // The app may already be gone; nothing is left to unblock then
            let _ = tx.send(self.ticket);
        }
    }
}
