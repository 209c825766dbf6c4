// Resume document intake: share-link resolution, download, and PDF text extraction.
// Network I/O lives in fetcher; extractor is pure and CPU-bound.

pub mod extractor;
pub mod fetcher;

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

pub fn has_pdf_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

pub use extractor::{extract_text_blocking, ExtractError};
pub use fetcher::{DocumentFetcher, FetchError, ResumeSource};
