//! Load lifecycle of the single live document.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{NotReady, ParseError};
use crate::model::{DocumentHandle, LoadState, ParsedDocument};

/// Ticket identifying one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub epoch: u64,
}

/// Result of applying a parse completion
#[derive(Debug)]
pub enum LoadOutcome {
    /// Document is ready; carries the new handle
    Ready(DocumentHandle),
    /// Parse failed; the session is now `Failed`
    Failed(ParseError),
    /// Completion belongs to a superseded load and was discarded
    Stale,
}

struct PendingSource {
    name: Option<String>,
    bytes: Arc<[u8]>,
}

/// Owns the load-state machine and the live [`DocumentHandle`]
pub struct DocumentSession {
    state: LoadState,
    epoch: u64,
    handle: Option<DocumentHandle>,
    pending: Option<PendingSource>,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self {
            state: LoadState::Unloaded,
            epoch: 0,
            handle: None,
            pending: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Current load generation. Bumped on every `begin_load`.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn handle(&self) -> Option<&DocumentHandle> {
        self.handle.as_ref()
    }

    /// Enter `Loading`, discarding any previous handle.
    ///
    /// Returns the discarded handle so the caller can release engine
    /// resources for it.
    pub fn begin_load(&mut self, name: Option<String>, bytes: Arc<[u8]>) -> (LoadTicket, Option<DocumentHandle>) {
        self.epoch += 1;
        let previous = self.handle.take();
        self.pending = Some(PendingSource { name, bytes });
        self.state = LoadState::Loading;
        debug!(epoch = self.epoch, replaced = previous.is_some(), "document load started");
        (LoadTicket { epoch: self.epoch }, previous)
    }

    /// Apply the rendering engine's answer for `ticket`
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<ParsedDocument, ParseError>) -> LoadOutcome {
        if ticket.epoch != self.epoch || self.state != LoadState::Loading {
            warn!(
                ticket = ticket.epoch,
                current = self.epoch,
                "discarding parse result for superseded load"
            );
            return LoadOutcome::Stale;
        }

        let Some(source) = self.pending.take() else {
            return LoadOutcome::Stale;
        };

        let parsed = result.and_then(|parsed| {
            if parsed.page_count == 0 {
                Err(ParseError::NoPages)
            } else {
                Ok(parsed)
            }
        });

        match parsed {
            Ok(parsed) => {
                let handle = DocumentHandle::new(self.epoch, source.name, parsed.page_count, source.bytes);
                info!(
                    epoch = self.epoch,
                    document = %handle.id(),
                    pages = parsed.page_count,
                    "document ready"
                );
                self.handle = Some(handle.clone());
                self.state = LoadState::Ready;
                LoadOutcome::Ready(handle)
            }
            Err(err) => {
                warn!(epoch = self.epoch, error = %err, "document failed to load");
                self.state = LoadState::Failed;
                LoadOutcome::Failed(err)
            }
        }
    }

    pub fn current_page_count(&self) -> Result<u32, NotReady> {
        match (&self.handle, self.state) {
            (Some(handle), LoadState::Ready) => Ok(handle.page_count()),
            _ => Err(NotReady),
        }
    }
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes() -> Arc<[u8]> {
        Arc::from(&b"%PDF-1.7"[..])
    }

    #[test]
    fn page_count_requires_ready() {
        let mut session = DocumentSession::new();
        assert_eq!(session.current_page_count(), Err(NotReady));

        let (ticket, _) = session.begin_load(None, bytes());
        assert_eq!(session.state(), LoadState::Loading);
        assert_eq!(session.current_page_count(), Err(NotReady));

        let outcome = session.complete_load(ticket, Ok(ParsedDocument::new(5)));
        assert!(matches!(outcome, LoadOutcome::Ready(_)));
        assert_eq!(session.current_page_count(), Ok(5));
    }

    #[test]
    fn failure_keeps_no_handle() {
        let mut session = DocumentSession::new();
        let (ticket, _) = session.begin_load(None, bytes());
        let outcome = session.complete_load(ticket, Err(ParseError::Malformed("bad xref".into())));
        assert!(matches!(outcome, LoadOutcome::Failed(ParseError::Malformed(_))));
        assert_eq!(session.state(), LoadState::Failed);
        assert!(session.handle().is_none());
        assert_eq!(session.current_page_count(), Err(NotReady));
    }

    #[test]
    fn zero_pages_is_a_parse_failure() {
        let mut session = DocumentSession::new();
        let (ticket, _) = session.begin_load(None, bytes());
        let outcome = session.complete_load(ticket, Ok(ParsedDocument::new(0)));
        assert!(matches!(outcome, LoadOutcome::Failed(ParseError::NoPages)));
    }

    #[test]
    fn superseded_load_is_stale() {
        let mut session = DocumentSession::new();
        let (first, _) = session.begin_load(Some("a.pdf".into()), bytes());
        let (second, _) = session.begin_load(Some("b.pdf".into()), bytes());

        assert!(matches!(
            session.complete_load(first, Ok(ParsedDocument::new(3))),
            LoadOutcome::Stale
        ));
        assert_eq!(session.state(), LoadState::Loading);

        let LoadOutcome::Ready(handle) = session.complete_load(second, Ok(ParsedDocument::new(9))) else {
            panic!("second load should be applied");
        };
        assert_eq!(handle.name(), Some("b.pdf"));
        assert_eq!(handle.page_count(), 9);
    }

    #[test]
    fn new_load_discards_previous_handle() {
        let mut session = DocumentSession::new();
        let (ticket, _) = session.begin_load(None, bytes());
        session.complete_load(ticket, Ok(ParsedDocument::new(2)));

        let (_, previous) = session.begin_load(None, bytes());
        assert_eq!(previous.map(|h| h.page_count()), Some(2));
        assert!(session.handle().is_none());
    }

    #[test]
    fn completion_after_apply_is_stale() {
        let mut session = DocumentSession::new();
        let (ticket, _) = session.begin_load(None, bytes());
        session.complete_load(ticket, Ok(ParsedDocument::new(2)));
        assert!(matches!(
            session.complete_load(ticket, Ok(ParsedDocument::new(4))),
            LoadOutcome::Stale
        ));
        assert_eq!(session.current_page_count(), Ok(2));
    }
}
