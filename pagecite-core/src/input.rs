//! Validation of candidate documents before they reach the session.

use std::path::Path;
use std::sync::Arc;

use crate::error::InputError;

const PDF_EXTENSION: &str = "pdf";
const PDF_MEDIA_TYPE: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";
// Readers tolerate junk before the header as long as it starts in the first KiB
const MAGIC_SEARCH_WINDOW: usize = 1024;

/// Bytes that claim to be a renderable document
#[derive(Debug, Clone)]
pub struct DocumentSource {
    name: Option<String>,
    bytes: Arc<[u8]>,
}

impl DocumentSource {
    /// Validate named bytes: `.pdf` extension and a PDF header
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<Self, InputError> {
        let name = name.into();
        check_extension(Path::new(&name))?;
        Self::checked(Some(name), bytes.into())
    }

    /// Validate a browser-style upload, where a media type may accompany the file
    pub fn from_upload(
        name: impl Into<String>,
        media_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<Self, InputError> {
        if let Some(media_type) = media_type {
            let essence = media_type.split(';').next().unwrap_or_default().trim();
            if !essence.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
                return Err(InputError::UnsupportedMediaType(media_type.to_string()));
            }
        }
        Self::from_bytes(name, bytes)
    }

    /// Read and validate a document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        check_extension(path)?;
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string());
        Self::checked(name, bytes)
    }

    /// Skip validation, for hosts that vetted the input elsewhere
    pub fn unchecked(name: Option<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Arc<[u8]>) {
        (self.name, self.bytes)
    }

    fn checked(name: Option<String>, bytes: Vec<u8>) -> Result<Self, InputError> {
        if bytes.is_empty() {
            return Err(InputError::Empty);
        }
        let window = &bytes[..bytes.len().min(MAGIC_SEARCH_WINDOW)];
        if !window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            return Err(InputError::NotPdf);
        }
        Ok(Self {
            name,
            bytes: Arc::from(bytes),
        })
    }
}

fn check_extension(path: &Path) -> Result<(), InputError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(PDF_EXTENSION) => Ok(()),
        Some(ext) => Err(InputError::UnsupportedExtension(ext.to_string())),
        None => Err(InputError::UnsupportedExtension(String::new())),
    }
}
