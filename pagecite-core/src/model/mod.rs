mod document;
mod evidence;
mod exchange;
mod focus;

pub use document::{DocumentContext, DocumentHandle, DocumentId, LoadState, ParsedDocument};
pub use evidence::{Evidence, SourceSpanHint};
pub use exchange::{Answer, Exchange};
pub use focus::{ResolvedReference, ViewerFocus};
