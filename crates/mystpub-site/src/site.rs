//! Site manager.
//!
//! [`Site`] owns the read-only [`PageStructure`] and a per-page cache of the
//! cross-references found while documents are processed. The structure never
//! changes after the build; only the cache is written, one slot per page.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use mystpub_myst::Document;

use crate::error::TocError;
use crate::structure::{PageStructure, build_structure};
use crate::xref::{CrossReference, ReferenceResolver};

/// Page structure together with the cross-reference cache.
///
/// # Thread Safety
///
/// `Site` is `Send + Sync`. The cache sits behind an `RwLock`; lookups clone
/// the cached list so no lock is held by callers.
pub struct Site {
    structure: PageStructure,
    references: RwLock<HashMap<String, Vec<CrossReference>>>,
}

impl Site {
    /// Wrap an already built structure.
    #[must_use]
    pub fn new(structure: PageStructure) -> Self {
        Self {
            structure,
            references: RwLock::new(HashMap::new()),
        }
    }

    /// Build the structure from a TOC description.
    ///
    /// # Errors
    ///
    /// Returns [`TocError`] if the structure cannot be built.
    pub fn load(config_path: &Path, base_dir: &Path) -> Result<Self, TocError> {
        build_structure(config_path, base_dir).map(Self::new)
    }

    /// The page structure.
    #[must_use]
    pub fn structure(&self) -> &PageStructure {
        &self.structure
    }

    /// Resolver over this site's pages.
    #[must_use]
    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(&self.structure)
    }

    /// Collect and resolve the references in `document`, cache them under
    /// `current_slug` and return them.
    ///
    /// Unresolved references are logged and kept in the result with
    /// `resolved == false`.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn process_cross_references(&self, document: &Document, current_slug: &str) -> Vec<CrossReference> {
        let references = self.resolver().collect(document);

        for reference in references.iter().filter(|r| !r.resolved) {
            tracing::warn!(
                page = current_slug,
                role = %reference.role,
                token = %reference.token,
                "Unresolved cross-reference"
            );
        }
        tracing::debug!(
            page = current_slug,
            count = references.len(),
            "Processed cross-references"
        );

        self.references
            .write()
            .unwrap()
            .insert(current_slug.to_owned(), references.clone());
        references
    }

    /// Cached references of a page, empty if it was never processed.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn cross_references(&self, slug: &str) -> Vec<CrossReference> {
        self.references
            .read()
            .unwrap()
            .get(slug)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use mystpub_myst::{Node, NodeKind};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::structure::tests::sample;

    static_assertions::assert_impl_all!(Site: Send, Sync);

    fn document(tokens: &[&str]) -> Document {
        let paragraph = tokens.iter().fold(Node::new(NodeKind::Paragraph), |p, token| {
            p.with_child(
                Node::new(NodeKind::Role {
                    name: "ref".to_owned(),
                })
                .with_value(*token),
            )
        });
        Document::new(Node::new(NodeKind::Root).with_child(paragraph))
    }

    #[test]
    fn test_process_caches_by_slug() {
        let site = Site::new(sample());

        let returned = site.process_cross_references(&document(&["#faq", "Nowhere"]), "intro");

        assert_eq!(returned.len(), 2);
        assert_eq!(site.cross_references("intro"), returned);
        assert!(site.cross_references("faq").is_empty());
    }

    #[test]
    fn test_unresolved_kept_in_result() {
        let site = Site::new(sample());

        let references = site.process_cross_references(&document(&["#installation"]), "index");

        assert_eq!(references.len(), 1);
        assert!(!references[0].resolved);
        assert_eq!(references[0].target.as_deref(), Some("#installation"));
    }

    #[test]
    fn test_reprocessing_replaces_cache() {
        let site = Site::new(sample());
        site.process_cross_references(&document(&["#faq", "#about"]), "intro");

        site.process_cross_references(&document(&["#about"]), "intro");

        assert_eq!(site.cross_references("intro").len(), 1);
    }

    #[test]
    fn test_load_builds_structure() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("myst.yml");
        std::fs::write(&config, "project:\n  toc:\n    - file: index.md\n").unwrap();

        let site = Site::load(&config, dir.path()).unwrap();

        assert_eq!(site.structure().len(), 1);
    }
}
