//! Error types for structure building.

use std::path::PathBuf;

/// Error loading the TOC description or building the structure from it.
///
/// All variants are fatal for a build: nothing useful can be published
/// without a valid table of contents.
#[derive(Debug, thiserror::Error)]
pub enum TocError {
    /// Configuration file does not exist.
    #[error("TOC configuration not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid YAML or has the wrong shape.
    #[error("invalid TOC configuration {}: {source}", path.display())]
    Yaml {
        /// Configuration file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Configuration has no `project.toc` section.
    #[error("{} has no project.toc section", .0.display())]
    MissingToc(PathBuf),

    /// An entry has neither `file`, `pattern`, `title` nor `children`.
    #[error("invalid TOC entry at {position}: {reason}")]
    InvalidEntry {
        /// Dotted 1-based position of the entry (e.g. `2.1`).
        position: String,
        /// What is wrong with the entry.
        reason: String,
    },

    /// A `pattern` entry is not a valid glob.
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        /// Pattern as written in the TOC.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: glob::PatternError,
    },
}
