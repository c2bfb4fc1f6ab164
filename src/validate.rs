//! Payload validation for downloaded books.
//!
//! EPUB is a ZIP container, so a real book starts with the local-file-header
//! magic `PK\x03\x04`. Anything else (most often an HTML error or paywall page
//! served with a 200) is rejected before it reaches storage.

use thiserror::Error;

/// Leading bytes of a ZIP local file header.
pub const EPUB_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content types that indicate a page rather than a file.
const MARKUP_CONTENT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

/// A payload that is not the expected binary container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentMismatch {
    /// The server answered with a markup page instead of a file.
    #[error("link leads to an HTML page ({content_type}), not an EPUB file")]
    InvalidContentType {
        /// The offending `Content-Type` value.
        content_type: String,
    },

    /// The first bytes are not the ZIP signature.
    #[error("downloaded file is not a valid EPUB (missing ZIP signature, got {found})")]
    InvalidFileSignature {
        /// Hex rendering of the leading bytes actually received.
        found: String,
    },
}

/// Validates a downloaded payload against its `Content-Type` and leading bytes.
///
/// # Errors
///
/// Returns [`ContentMismatch::InvalidContentType`] for markup content types and
/// [`ContentMismatch::InvalidFileSignature`] when the payload does not start with
/// [`EPUB_SIGNATURE`] (including payloads shorter than four bytes).
pub fn validate_payload(content_type: Option<&str>, bytes: &[u8]) -> Result<(), ContentMismatch> {
    if let Some(content_type) = content_type
        && is_markup_content_type(content_type)
    {
        return Err(ContentMismatch::InvalidContentType {
            content_type: content_type.to_string(),
        });
    }

    if !bytes.starts_with(&EPUB_SIGNATURE) {
        return Err(ContentMismatch::InvalidFileSignature {
            found: hex_prefix(bytes),
        });
    }

    Ok(())
}

/// Returns true if `content_type` names a markup document.
#[must_use]
pub fn is_markup_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    MARKUP_CONTENT_TYPES.contains(&mime.as_str())
}

fn hex_prefix(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty payload".to_string();
    }
    bytes
        .iter()
        .take(EPUB_SIGNATURE.len())
        .map(|b| format!("{b:02x}"))
        .collect()
}
