//! Page structure with navigation indices.
//!
//! Pages are stored in a flat `Vec<Page>` in traversal order with a slug
//! index for O(1) lookups. Breadcrumb trails and sibling lists are derived
//! once, right after the build, and kept for the lifetime of the structure.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Instant;

use crate::builder::build_pages;
use crate::error::TocError;
use crate::page::Page;
use crate::toc::TocConfig;

/// Immutable site structure built from a TOC description.
#[derive(Debug)]
pub struct PageStructure {
    title: Option<String>,
    pages: Vec<Page>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
    breadcrumbs: Vec<Vec<usize>>,
    siblings: Vec<Vec<usize>>,
}

/// Load the TOC description at `config_path` and build the structure.
///
/// TOC paths are resolved against `base_dir`.
///
/// # Errors
///
/// Returns [`TocError`] if the configuration is missing, malformed, lacks a
/// `project.toc` section, or contains an invalid glob pattern.
pub fn build_structure(config_path: &Path, base_dir: &Path) -> Result<PageStructure, TocError> {
    let start = Instant::now();
    let config = TocConfig::load(config_path)?;
    let structure = PageStructure::from_config(&config, base_dir)?;

    tracing::info!(
        config = %config_path.display(),
        page_count = structure.len(),
        root_count = structure.roots.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Page structure built"
    );
    Ok(structure)
}

impl PageStructure {
    /// Build the structure from an already parsed TOC description.
    ///
    /// # Errors
    ///
    /// Returns [`TocError::Pattern`] for invalid glob patterns.
    pub fn from_config(config: &TocConfig, base_dir: &Path) -> Result<Self, TocError> {
        let pages = build_pages(config, base_dir)?;
        Ok(Self::new(config.title.clone(), pages))
    }

    /// Create a structure from pages in traversal order.
    ///
    /// Parent and child links are taken from the pages themselves.
    pub(crate) fn new(title: Option<String>, pages: Vec<Page>) -> Self {
        let index: HashMap<String, usize> = pages
            .iter()
            .enumerate()
            .map(|(i, page)| (page.slug.clone(), i))
            .collect();

        let lookup = |slug: &String| index.get(slug).copied();
        let parents: Vec<Option<usize>> = pages
            .iter()
            .map(|page| page.parent.as_ref().and_then(lookup))
            .collect();
        let children: Vec<Vec<usize>> = pages
            .iter()
            .map(|page| page.children.iter().filter_map(lookup).collect())
            .collect();
        let roots = (0..pages.len()).filter(|&i| parents[i].is_none()).collect();

        let breadcrumbs = (0..pages.len())
            .map(|i| {
                let mut trail = Vec::new();
                let mut current = Some(i);
                while let Some(idx) = current {
                    trail.push(idx);
                    current = parents[idx];
                }
                trail.reverse();
                trail
            })
            .collect();

        let siblings = (0..pages.len())
            .map(|i| match parents[i] {
                Some(parent) => children[parent].iter().copied().filter(|&j| j != i).collect(),
                None => Vec::new(),
            })
            .collect();

        Self {
            title,
            pages,
            index,
            roots,
            children,
            breadcrumbs,
            siblings,
        }
    }

    /// Project title from the TOC description.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True if the structure has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Check whether a slug is registered.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    /// Get page by slug.
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.index.get(slug).map(|&i| &self.pages[i])
    }

    /// All pages in traversal order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Root-level pages in declaration order.
    #[must_use]
    pub fn root_pages(&self) -> Vec<&Page> {
        self.roots.iter().map(|&i| &self.pages[i]).collect()
    }

    /// Direct children of a page. Empty for unknown slugs.
    #[must_use]
    pub fn children(&self, slug: &str) -> Vec<&Page> {
        self.indexed(slug, &self.children)
    }

    /// Parent of a page, `None` for root pages and unknown slugs.
    #[must_use]
    pub fn parent(&self, slug: &str) -> Option<&Page> {
        self.get_page(slug)?
            .parent
            .as_deref()
            .and_then(|parent| self.get_page(parent))
    }

    /// Trail from a root page down to and including the page itself.
    ///
    /// Empty for unknown slugs.
    #[must_use]
    pub fn breadcrumbs(&self, slug: &str) -> Vec<&Page> {
        self.indexed(slug, &self.breadcrumbs)
    }

    /// Other children of the page's parent, in child-list order.
    ///
    /// Root pages have no siblings.
    #[must_use]
    pub fn siblings(&self, slug: &str) -> Vec<&Page> {
        self.indexed(slug, &self.siblings)
    }

    fn indexed<'a>(&'a self, slug: &str, table: &'a [Vec<usize>]) -> Vec<&'a Page> {
        self.index
            .get(slug)
            .map(|&i| table[i].iter().map(|&j| &self.pages[j]).collect())
            .unwrap_or_default()
    }

    /// Metadata exposed to the publisher for a page.
    ///
    /// Keys: `slug`, `title`, `order` (1-based), `total`, `position`
    /// (`page N of M`), `level` and, for non-root pages, `parent`.
    #[must_use]
    pub fn metadata(&self, slug: &str) -> Option<BTreeMap<String, String>> {
        let page = self.get_page(slug)?;
        let position = page.order + 1;
        let total = self.len();

        let mut meta = BTreeMap::from([
            ("slug".to_owned(), page.slug.clone()),
            ("title".to_owned(), page.title.clone()),
            ("order".to_owned(), position.to_string()),
            ("total".to_owned(), total.to_string()),
            ("position".to_owned(), format!("page {position} of {total}")),
            ("level".to_owned(), page.level.to_string()),
        ]);
        if let Some(parent) = &page.parent {
            meta.insert("parent".to_owned(), parent.clone());
        }
        Some(meta)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(PageStructure: Send, Sync);

    /// Structure used across module tests:
    ///
    /// ```text
    /// index
    /// guide (section)
    ///   intro
    ///   install
    ///     linux
    ///   faq
    /// about
    /// ```
    pub(crate) fn sample() -> PageStructure {
        let mut pages = vec![
            file_page("index", "Home", 0, None, 0),
            section_page("guide", "Guide", 0, None, 1),
            file_page("intro", "Introduction", 1, Some("guide"), 2),
            file_page("install", "Installation", 1, Some("guide"), 3),
            file_page("linux", "Linux", 2, Some("install"), 4),
            file_page("faq", "FAQ", 1, Some("guide"), 5),
            file_page("about", "About", 0, None, 6),
        ];
        pages[1].children = vec!["intro".into(), "install".into(), "faq".into()];
        pages[3].children = vec!["linux".into()];
        PageStructure::new(Some("Handbook".to_owned()), pages)
    }

    fn file_page(slug: &str, title: &str, level: usize, parent: Option<&str>, order: usize) -> Page {
        Page {
            path: PathBuf::from(format!("/docs/{slug}.md")),
            title: title.to_owned(),
            slug: slug.to_owned(),
            level,
            parent: parent.map(str::to_owned),
            children: Vec::new(),
            order,
        }
    }

    fn section_page(slug: &str, title: &str, level: usize, parent: Option<&str>, order: usize) -> Page {
        Page {
            path: PathBuf::new(),
            ..file_page(slug, title, level, parent, order)
        }
    }

    fn slugs(pages: &[&Page]) -> Vec<String> {
        pages.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_get_page_returns_page() {
        let structure = sample();

        let page = structure.get_page("intro").unwrap();

        assert_eq!(page.title, "Introduction");
        assert!(structure.get_page("missing").is_none());
    }

    #[test]
    fn test_pages_in_traversal_order() {
        let structure = sample();

        let orders: Vec<usize> = structure.pages().iter().map(|p| p.order).collect();

        assert_eq!(orders, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(structure.len(), 7);
        assert_eq!(structure.title(), Some("Handbook"));
    }

    #[test]
    fn test_root_pages() {
        let structure = sample();

        assert_eq!(slugs(&structure.root_pages()), vec!["index", "guide", "about"]);
    }

    #[test]
    fn test_children_direct_only() {
        let structure = sample();

        assert_eq!(slugs(&structure.children("guide")), vec!["intro", "install", "faq"]);
        assert!(structure.children("intro").is_empty());
        assert!(structure.children("missing").is_empty());
    }

    #[test]
    fn test_parent() {
        let structure = sample();

        assert_eq!(structure.parent("linux").unwrap().slug, "install");
        assert!(structure.parent("guide").is_none());
        assert!(structure.parent("missing").is_none());
    }

    #[test]
    fn test_breadcrumbs_root_to_leaf() {
        let structure = sample();

        assert_eq!(
            slugs(&structure.breadcrumbs("linux")),
            vec!["guide", "install", "linux"]
        );
    }

    #[test]
    fn test_breadcrumbs_root_page_is_itself() {
        let structure = sample();

        assert_eq!(slugs(&structure.breadcrumbs("about")), vec!["about"]);
        assert!(structure.breadcrumbs("missing").is_empty());
    }

    #[test]
    fn test_siblings_exclude_self() {
        let structure = sample();

        assert_eq!(slugs(&structure.siblings("install")), vec!["intro", "faq"]);
        assert!(structure.siblings("linux").is_empty());
    }

    #[test]
    fn test_root_pages_have_no_siblings() {
        let structure = sample();

        assert!(structure.siblings("index").is_empty());
        assert!(structure.siblings("guide").is_empty());
    }

    #[test]
    fn test_hierarchy_invariants() {
        let structure = sample();

        for page in structure.pages() {
            let trail = structure.breadcrumbs(&page.slug);
            assert_eq!(trail.last().unwrap().slug, page.slug);
            assert!(trail[0].is_root());

            if let Some(parent) = structure.parent(&page.slug) {
                let count = parent.children.iter().filter(|c| **c == page.slug).count();
                assert_eq!(count, 1);

                let mut expected = parent.children.clone();
                expected.retain(|c| *c != page.slug);
                assert_eq!(slugs(&structure.siblings(&page.slug)), expected);
            } else {
                assert_eq!(trail.len(), 1);
            }
        }
    }

    #[test]
    fn test_metadata() {
        let structure = sample();

        let meta = structure.metadata("install").unwrap();

        assert_eq!(meta["order"], "4");
        assert_eq!(meta["total"], "7");
        assert_eq!(meta["position"], "page 4 of 7");
        assert_eq!(meta["level"], "1");
        assert_eq!(meta["parent"], "guide");
        assert!(structure.metadata("index").unwrap().get("parent").is_none());
        assert!(structure.metadata("missing").is_none());
    }

    #[test]
    fn test_build_structure_from_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("myst.yml"),
            "project:\n  toc:\n    - file: index.md\n    - title: Guide\n      children:\n        - file: intro.md\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("intro.md"), "# Getting Started\n").unwrap();

        let structure = build_structure(&dir.path().join("myst.yml"), dir.path()).unwrap();

        let index = structure.get_page("index").unwrap();
        assert_eq!(index.order, 0);
        assert!(index.is_root());
        let guide = structure.get_page("guide").unwrap();
        assert_eq!(guide.order, 1);
        assert!(guide.is_root());
        let intro = structure.get_page("intro").unwrap();
        assert_eq!(intro.order, 2);
        assert_eq!(intro.level, 1);
        assert_eq!(intro.parent.as_deref(), Some("guide"));
        assert_eq!(intro.title, "Getting Started");
    }

    #[test]
    fn test_build_structure_missing_config() {
        let err = build_structure(Path::new("/nonexistent/myst.yml"), Path::new("/")).unwrap_err();

        assert!(matches!(err, TocError::NotFound(_)));
    }

    #[test]
    fn test_build_structure_missing_toc() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("myst.yml");
        std::fs::write(&config, "project:\n  title: Empty\n").unwrap();

        let err = build_structure(&config, dir.path()).unwrap_err();

        assert!(matches!(err, TocError::MissingToc(_)));
    }
}
