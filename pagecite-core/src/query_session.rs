//! Append-only conversation ledger and submission gate.
//!
//! Questions get a sequence number when submitted. Answers may come back in
//! any order; they wait in `settled` until every earlier question has been
//! settled, so history always reads in submission order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{EngineError, QueryError};
use crate::logging::loggable;
use crate::model::{Answer, DocumentContext, Exchange};

/// Identifies one submitted question within one document epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket {
    pub epoch: u64,
    pub seq: u64,
}

/// Everything needed to forward an accepted question to the QA engine
#[derive(Debug, Clone)]
pub struct Submission {
    pub ticket: QueryTicket,
    pub question: String,
    pub context: DocumentContext,
}

/// Result of settling a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// `n` exchanges were appended to history (0 when still waiting on an
    /// earlier question)
    Committed(usize),
    /// The ticket belongs to a superseded document or was already settled
    Stale,
}

struct InFlight {
    question: String,
    asked_at: DateTime<Utc>,
}

pub struct QuerySession {
    epoch: u64,
    context: Option<DocumentContext>,
    history: Vec<Exchange>,
    next_seq: u64,
    next_commit: u64,
    in_flight: BTreeMap<u64, InFlight>,
    settled: BTreeMap<u64, Exchange>,
    max_question_chars: usize,
    clear_history_on_load: bool,
}

impl QuerySession {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            epoch: 0,
            context: None,
            history: Vec::new(),
            next_seq: 0,
            next_commit: 0,
            in_flight: BTreeMap::new(),
            settled: BTreeMap::new(),
            max_question_chars: config.max_question_chars,
            clear_history_on_load: config.clear_history_on_load,
        }
    }

    /// A new document started loading: block submissions and orphan every
    /// outstanding ticket.
    pub fn on_load_started(&mut self, epoch: u64) {
        let dropped = self.in_flight.len();
        if dropped > 0 {
            debug!(dropped, "orphaning in-flight questions for superseded document");
        }
        self.epoch = epoch;
        self.context = None;
        self.in_flight.clear();
        self.settled.clear();
        self.next_seq = 0;
        self.next_commit = 0;
        if self.clear_history_on_load {
            self.history.clear();
        }
    }

    /// The document for the current epoch is ready; unblock submissions
    pub fn on_document_ready(&mut self, context: DocumentContext) {
        self.context = Some(context);
    }

    pub fn accepts_questions(&self) -> bool {
        self.context.is_some()
    }

    /// Accept a question and hand out its ticket.
    ///
    /// Leading and trailing whitespace is trimmed before validation.
    pub fn submit(&mut self, text: &str) -> Result<Submission, QueryError> {
        let Some(context) = &self.context else {
            return Err(QueryError::NoDocument);
        };

        let question = text.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        let len = question.chars().count();
        if len > self.max_question_chars {
            return Err(QueryError::QuestionTooLong {
                len,
                max: self.max_question_chars,
            });
        }

        let ticket = QueryTicket {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.in_flight.insert(
            ticket.seq,
            InFlight {
                question: question.to_string(),
                asked_at: Utc::now(),
            },
        );
        debug!(seq = ticket.seq, question = %loggable(question), "question submitted");

        Ok(Submission {
            ticket,
            question: question.to_string(),
            context: context.clone(),
        })
    }

    /// Record the engine's response for `ticket` and commit every exchange
    /// that is now next in line.
    pub fn settle(&mut self, ticket: QueryTicket, result: Result<Vec<Answer>, EngineError>) -> Settled {
        if ticket.epoch != self.epoch {
            warn!(
                ticket = ticket.epoch,
                current = self.epoch,
                "discarding answer for superseded document"
            );
            return Settled::Stale;
        }
        let Some(in_flight) = self.in_flight.remove(&ticket.seq) else {
            warn!(seq = ticket.seq, "discarding answer for unknown or settled question");
            return Settled::Stale;
        };

        let exchange = match result {
            Ok(answers) => Exchange::answered(in_flight.question, answers, in_flight.asked_at),
            Err(err) => {
                warn!(seq = ticket.seq, error = %err, "answer engine failed");
                Exchange::failed(in_flight.question, &err, in_flight.asked_at)
            }
        };
        self.settled.insert(ticket.seq, exchange);

        let mut committed = 0;
        while let Some(exchange) = self.settled.remove(&self.next_commit) {
            info!(
                seq = self.next_commit,
                answers = exchange.answers().len(),
                error = exchange.is_error(),
                "exchange committed"
            );
            self.history.push(exchange);
            self.next_commit += 1;
            committed += 1;
        }
        if committed == 0 {
            debug!(seq = ticket.seq, waiting_on = self.next_commit, "answer buffered behind earlier question");
        }
        Settled::Committed(committed)
    }

    /// Settle `ticket` as cancelled, as if the engine had failed
    pub fn abandon(&mut self, ticket: QueryTicket) -> Settled {
        self.settle(ticket, Err(EngineError::Cancelled))
    }

    /// Committed exchanges in submission order
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Questions submitted but not yet committed
    pub fn pending_count(&self) -> usize {
        self.in_flight.len() + self.settled.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::Evidence;

    fn context() -> DocumentContext {
        DocumentContext {
            document_id: uuid::Uuid::new_v4(),
            name: None,
            page_count: 5,
            bytes: Arc::from(&b"%PDF-"[..]),
        }
    }

    fn ready_session() -> QuerySession {
        let mut session = QuerySession::new(&SessionConfig::default());
        session.on_load_started(1);
        session.on_document_ready(context());
        session
    }

    fn answer(text: &str) -> Vec<Answer> {
        vec![Answer::new(text, Evidence::new(text, 1).unwrap())]
    }

    #[test]
    fn rejects_without_document() {
        let mut session = QuerySession::new(&SessionConfig::default());
        assert_eq!(session.submit("hello").unwrap_err(), QueryError::NoDocument);

        session.on_load_started(1);
        assert_eq!(session.submit("hello").unwrap_err(), QueryError::NoDocument);
        assert!(session.history().is_empty());
    }

    #[test]
    fn rejects_blank_and_oversized_questions() {
        let config = SessionConfig {
            max_question_chars: 4,
            ..SessionConfig::default()
        };
        let mut session = QuerySession::new(&config);
        session.on_load_started(1);
        session.on_document_ready(context());

        assert_eq!(session.submit("   ").unwrap_err(), QueryError::EmptyQuestion);
        assert_eq!(
            session.submit("hello").unwrap_err(),
            QueryError::QuestionTooLong { len: 5, max: 4 }
        );
        assert_eq!(session.submit("  why ").unwrap().question, "why");
    }

    #[test]
    fn out_of_order_answers_commit_in_submission_order() {
        let mut session = ready_session();
        let first = session.submit("first").unwrap().ticket;
        let second = session.submit("second").unwrap().ticket;
        let third = session.submit("third").unwrap().ticket;

        assert_eq!(session.settle(third, Ok(answer("c"))), Settled::Committed(0));
        assert_eq!(session.settle(second, Ok(answer("b"))), Settled::Committed(0));
        assert!(session.history().is_empty());
        assert_eq!(session.pending_count(), 3);

        assert_eq!(session.settle(first, Ok(answer("a"))), Settled::Committed(3));
        let questions: Vec<_> = session.history().iter().map(Exchange::question).collect();
        assert_eq!(questions, ["first", "second", "third"]);
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn engine_failure_becomes_error_exchange() {
        let mut session = ready_session();
        let first = session.submit("first").unwrap().ticket;
        let second = session.submit("second").unwrap().ticket;

        session.settle(second, Ok(answer("b")));
        session.settle(first, Err(EngineError::Failed("boom".into())));

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_error());
        assert!(history[0].answers().is_empty());
        assert!(!history[1].is_error());
    }

    #[test]
    fn abandoned_question_unblocks_later_answers() {
        let mut session = ready_session();
        let dropped = session.submit("dropped").unwrap().ticket;
        let later = session.submit("later").unwrap().ticket;

        assert_eq!(session.settle(later, Ok(answer("b"))), Settled::Committed(0));
        assert_eq!(session.abandon(dropped), Settled::Committed(2));

        let history = session.history();
        assert_eq!(history[0].error(), Some(EngineError::Cancelled.to_string().as_str()));
        assert_eq!(history[1].question(), "later");
        assert_eq!(session.abandon(dropped), Settled::Stale);
    }

    #[test]
    fn stale_and_duplicate_tickets_are_discarded() {
        let mut session = ready_session();
        let old = session.submit("old").unwrap().ticket;

        session.on_load_started(2);
        session.on_document_ready(context());
        assert_eq!(session.settle(old, Ok(answer("x"))), Settled::Stale);
        assert!(session.history().is_empty());

        let fresh = session.submit("fresh").unwrap().ticket;
        assert_eq!(fresh.seq, 0);
        assert_eq!(session.settle(fresh, Ok(answer("y"))), Settled::Committed(1));
        assert_eq!(session.settle(fresh, Ok(answer("y"))), Settled::Stale);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn history_survives_load_when_configured() {
        let config = SessionConfig {
            clear_history_on_load: false,
            ..SessionConfig::default()
        };
        let mut session = QuerySession::new(&config);
        session.on_load_started(1);
        session.on_document_ready(context());
        let ticket = session.submit("kept").unwrap().ticket;
        session.settle(ticket, Ok(answer("a")));

        session.on_load_started(2);
        assert_eq!(session.history().len(), 1);
        assert!(!session.accepts_questions());
    }
}
