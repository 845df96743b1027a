//! CLI error types.

use mystpub_config::ConfigError;
use mystpub_myst::ParseError;
use mystpub_site::TocError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Toc(#[from] TocError),

    #[error("{0}")]
    Parser(#[from] ParseError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{failed} of {total} pages failed to publish")]
    PublishFailed { failed: usize, total: usize },
}
