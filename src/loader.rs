//! Document text extraction for uploaded files.
//!
//! Produces raw text blocks (one per PDF page, one per TXT file) from the
//! uploaded bytes. Corrupt or unsupported files report an error that the
//! ingest pipeline logs and skips; they never abort a batch.

use lopdf::Document;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while extracting text from an uploaded document.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to parse PDF: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Supported upload formats, derived from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Txt,
}

impl DocumentFormat {
    /// Detect the format from a filename (case-insensitive extension).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase())?;
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Txt),
            _ => None,
        }
    }
}

/// Extract raw text blocks from an uploaded file.
///
/// Returns one block per PDF page, or a single block for TXT. A file with
/// no extractable text yields an empty vector, which the caller treats as
/// "nothing indexed for it" rather than an error.
pub fn extract_blocks(name: &str, data: &[u8]) -> Result<Vec<String>, LoaderError> {
    let format = DocumentFormat::from_name(name)
        .ok_or_else(|| LoaderError::UnsupportedFormat(name.to_string()))?;

    match format {
        DocumentFormat::Pdf => extract_pdf(name, data),
        DocumentFormat::Txt => Ok(extract_txt(data)),
    }
}

fn extract_pdf(name: &str, data: &[u8]) -> Result<Vec<String>, LoaderError> {
    let doc = Document::load_mem(data)?;

    let mut blocks = Vec::new();
    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    blocks.push(trimmed.to_string());
                }
            }
            Err(e) => {
                warn!("Skipping unreadable page {page_num} of {name}: {e}");
            }
        }
    }

    Ok(blocks)
}

fn extract_txt(data: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(data);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}
