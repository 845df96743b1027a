//! Page data.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Page in the site structure.
///
/// Pages are created once while the TOC is traversed and never change
/// afterwards. Section headers are pages without a content file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Absolute content-file path. Empty for section headers.
    pub path: PathBuf,
    /// Display title (explicit, first H1, or file basename).
    pub title: String,
    /// Unique identifier within the structure.
    pub slug: String,
    /// Tree depth, 0 for root pages.
    pub level: usize,
    /// Slug of the parent page, `None` for root pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Slugs of direct children in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// Position in depth-first declaration order, starting at 0.
    pub order: usize,
}

impl Page {
    /// True if this page is a section header without a content file.
    #[must_use]
    pub fn is_section(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// Content file, `None` for section headers.
    #[must_use]
    pub fn content_path(&self) -> Option<&Path> {
        (!self.is_section()).then_some(self.path.as_path())
    }

    /// True if this page has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
