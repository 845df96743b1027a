//! Declarative table-of-contents description.
//!
//! The TOC lives in the MyST project file under `project.toc`:
//!
//! ```yaml
//! project:
//!   title: Handbook
//!   toc:
//!     - file: index.md
//!     - title: Guide
//!       children:
//!         - file: guide/intro.md
//!         - pattern: guide/topics/*.md
//! ```
//!
//! Each entry is one of a file page, a glob pattern, or a section header with
//! nested children. Declaration order is preserved.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TocError;

/// Entry of the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TocEntry {
    /// Single content file.
    File {
        /// Path relative to the base directory.
        file: PathBuf,
        /// Explicit title.
        title: Option<String>,
        /// Explicit slug.
        slug: Option<String>,
    },
    /// Glob pattern expanding to zero or more content files.
    Pattern {
        /// Glob relative to the base directory.
        pattern: String,
        /// Explicit title shared by every match.
        title: Option<String>,
        /// Explicit slug shared by every match.
        slug: Option<String>,
    },
    /// Section header without a content file.
    Section {
        /// Section title.
        title: Option<String>,
        /// Explicit slug.
        slug: Option<String>,
        /// Nested entries.
        children: Vec<TocEntry>,
    },
    /// External link. Not part of the page structure.
    Url {
        /// Link target.
        url: String,
    },
}

/// Parsed TOC description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocConfig {
    /// Project title (`project.title`).
    pub title: Option<String>,
    /// Top-level entries in declaration order.
    pub entries: Vec<TocEntry>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    project: Option<RawProject>,
}

#[derive(Deserialize)]
struct RawProject {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    toc: Option<Vec<RawEntry>>,
}

#[derive(Deserialize, Default)]
struct RawEntry {
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    children: Option<Vec<RawEntry>>,
    #[serde(default)]
    url: Option<String>,
}

impl TocConfig {
    /// Load the TOC description from a file.
    ///
    /// # Errors
    ///
    /// Returns [`TocError::NotFound`] if the file does not exist, and the
    /// errors of [`TocConfig::from_yaml`] otherwise.
    pub fn load(path: &Path) -> Result<Self, TocError> {
        if !path.exists() {
            return Err(TocError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| TocError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    /// Parse a TOC description. `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`TocError::Yaml`] for malformed YAML, [`TocError::MissingToc`]
    /// if `project.toc` is absent and [`TocError::InvalidEntry`] for entries
    /// that carry none of the recognized keys.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, TocError> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(|source| TocError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let project = raw
            .project
            .ok_or_else(|| TocError::MissingToc(path.to_path_buf()))?;
        let toc = project
            .toc
            .ok_or_else(|| TocError::MissingToc(path.to_path_buf()))?;

        Ok(Self {
            title: project.title,
            entries: convert_entries(toc, "")?,
        })
    }
}

fn convert_entries(raw: Vec<RawEntry>, prefix: &str) -> Result<Vec<TocEntry>, TocError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let position = if prefix.is_empty() {
                (i + 1).to_string()
            } else {
                format!("{prefix}.{}", i + 1)
            };
            convert_entry(entry, &position)
        })
        .collect()
}

/// Classify a raw entry. `file` wins over `pattern`, which wins over
/// `children`; the losing keys are ignored.
fn convert_entry(raw: RawEntry, position: &str) -> Result<TocEntry, TocError> {
    let RawEntry {
        file,
        title,
        slug,
        pattern,
        children,
        url,
    } = raw;

    if let Some(file) = file {
        if pattern.is_some() || children.is_some() {
            tracing::warn!(position, file = %file.display(), "TOC entry mixes file with pattern or children, using file");
        }
        return Ok(TocEntry::File { file, title, slug });
    }

    if let Some(pattern) = pattern {
        if children.is_some() {
            tracing::warn!(position, pattern, "TOC entry mixes pattern with children, using pattern");
        }
        return Ok(TocEntry::Pattern {
            pattern,
            title,
            slug,
        });
    }

    if let Some(url) = url {
        return Ok(TocEntry::Url { url });
    }

    if children.is_some() || title.is_some() {
        let children = convert_entries(children.unwrap_or_default(), position)?;
        return Ok(TocEntry::Section {
            title,
            slug,
            children,
        });
    }

    Err(TocError::InvalidEntry {
        position: position.to_owned(),
        reason: "expected one of file, pattern, title or children".to_owned(),
    })
}
