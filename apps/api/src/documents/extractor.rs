//! Text Extractor: PDF bytes to plain text.
//!
//! Pages are extracted individually and concatenated in page order with no
//! separator. A page with no text layer (scanned image) simply contributes
//! nothing; only a document that yields no text at all is an error, and it is
//! reported separately from a structural parse failure so the caller can
//! suggest the file is image-only.

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::documents::has_pdf_signature;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("content does not start with the %PDF signature")]
    InvalidPdfSignature,

    #[error("PDF parsed but no text was found in {pages} page(s)")]
    EmptyExtraction { pages: usize },

    #[error("PDF is corrupted or password-protected: {0}")]
    CorruptOrProtected(String),
}

/// Extracts the text of every page, in order, trimmed.
///
/// Never invokes the parser on bytes without the PDF signature. Parser panics
/// on malformed input are contained and reported as `CorruptOrProtected`.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if !has_pdf_signature(bytes) {
        return Err(ExtractError::InvalidPdfSignature);
    }

    let pages = match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!("PDF parse failed: {e}");
            return Err(ExtractError::CorruptOrProtected(e.to_string()));
        }
        Err(_) => {
            warn!("PDF parser aborted on malformed document");
            return Err(ExtractError::CorruptOrProtected(
                "document structure could not be read".to_string(),
            ));
        }
    };

    let text: String = pages.iter().map(String::as_str).collect();
    let text = text.trim();

    if text.is_empty() {
        return Err(ExtractError::EmptyExtraction { pages: pages.len() });
    }

    debug!("Extracted {} chars from {} page(s)", text.len(), pages.len());
    Ok(text.to_string())
}

/// Runs [`extract_text`] on the blocking pool so parsing never stalls the runtime.
pub async fn extract_text_blocking(bytes: Bytes) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| ExtractError::CorruptOrProtected(format!("extraction task failed: {e}")))?
}
