//! Error types for Confluence publishing.

use std::path::PathBuf;

use mystpub_myst::ParseError;

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

/// Error publishing a single page.
///
/// Never fatal for a run: the publisher records it and moves on to the next
/// page.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Content file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Content file.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: ParseError,
    },

    /// Page could not be written to Confluence.
    #[error("failed to publish page \"{title}\": {source}")]
    Confluence {
        /// Page title.
        title: String,
        /// Underlying API error.
        #[source]
        source: ConfluenceError,
    },
}
