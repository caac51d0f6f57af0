//! Maps QA evidence to a validated viewer target.
//!
//! Pure and synchronous: the same evidence, document and page count always
//! produce the same result. The excerpt is copied verbatim; locating it on
//! the page is the rendering surface's job. The reference is stamped with
//! the document it was checked against so it cannot be replayed on another.

use crate::error::ResolveError;
use crate::model::{DocumentId, Evidence, ResolvedReference};

/// Validate `evidence` against `document`, which has `page_count` pages
pub fn resolve(evidence: &Evidence, document: DocumentId, page_count: u32) -> Result<ResolvedReference, ResolveError> {
    let page = evidence.page_number();
    if page == 0 || page > page_count {
        return Err(ResolveError::OutOfRange { page, page_count });
    }
    Ok(ResolvedReference::new(document, page, evidence.excerpt_text().to_string()))
}
