//! TOC model builder.
//!
//! Turns a [`TocConfig`] into the flat, traversal-ordered list of [`Page`]s.
//!
//! # Traversal
//!
//! Entries are visited depth-first in declaration order. All mutable state
//! (order counter, slug registry, pages built so far) lives in a single
//! [`Traversal`] value owned by [`build_pages`] and passed down the recursion.
//! Every page, section headers included, takes the next order number.
//!
//! # Slug collisions
//!
//! A slug that is already taken gets the first free numeric suffix
//! (`intro`, `intro-2`, `intro-3`, ...). This applies to explicit slugs too,
//! so every page stays addressable and lookups agree with traversal order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use glob::Pattern;
use regex::Regex;

use crate::error::TocError;
use crate::page::Page;
use crate::slug::{slug_from_path, slugify, title_from_path};
use crate::toc::{TocConfig, TocEntry};

static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[ \t]+(.+)$").unwrap());

/// Slug used for sections whose title normalizes to nothing.
const SECTION_SLUG: &str = "section";

/// Slug used for files whose name normalizes to nothing.
const PAGE_SLUG: &str = "page";

/// Title for sections declared without one.
const UNTITLED: &str = "Untitled";

/// Build all pages described by `config`.
///
/// Paths in the TOC are resolved against `base_dir`.
///
/// # Errors
///
/// Returns [`TocError::Pattern`] if a `pattern` entry is not a valid glob.
pub(crate) fn build_pages(config: &TocConfig, base_dir: &Path) -> Result<Vec<Page>, TocError> {
    let mut traversal = Traversal::new(base_dir);
    traversal.visit_entries(&config.entries, 0, None)?;
    Ok(traversal.pages)
}

/// Extract the first level-1 heading of a Markdown file.
///
/// Returns `None` if the file cannot be read or has no H1. Leading YAML front
/// matter is skipped so that comment lines inside it are not mistaken for
/// headings.
pub(crate) fn extract_title(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path)
        .inspect_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "Cannot read file for title");
        })
        .ok()?;
    title_from_content(&content)
}

/// First level-1 heading outside front matter and fenced code blocks.
fn title_from_content(content: &str) -> Option<String> {
    let mut fence: Option<&str> = None;
    for line in strip_front_matter(content).lines() {
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            continue;
        }
        if let Some(caps) = H1.captures(line) {
            let title = caps[1].trim().trim_end_matches('#').trim();
            return (!title.is_empty()).then(|| title.to_owned());
        }
    }
    None
}

/// Content after a leading `---` front matter block.
///
/// Delimiters must be lines consisting of exactly `---`; CRLF line endings
/// are accepted. Unterminated front matter is left in place.
fn strip_front_matter(content: &str) -> &str {
    let mut lines = content.split_inclusive('\n');
    let is_delimiter = |line: &str| line.trim_end_matches(['\r', '\n']) == "---";

    let Some(first) = lines.next().filter(|line| is_delimiter(line)) else {
        return content;
    };
    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if is_delimiter(line) {
            return &content[offset..];
        }
    }
    content
}

/// Mutable state of one depth-first traversal.
struct Traversal<'a> {
    base_dir: &'a Path,
    next_order: usize,
    pages: Vec<Page>,
    slugs: HashMap<String, usize>,
}

impl<'a> Traversal<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            next_order: 0,
            pages: Vec::new(),
            slugs: HashMap::new(),
        }
    }

    fn visit_entries(
        &mut self,
        entries: &[TocEntry],
        level: usize,
        parent: Option<usize>,
    ) -> Result<(), TocError> {
        for entry in entries {
            self.visit_entry(entry, level, parent)?;
        }
        Ok(())
    }

    fn visit_entry(
        &mut self,
        entry: &TocEntry,
        level: usize,
        parent: Option<usize>,
    ) -> Result<(), TocError> {
        match entry {
            TocEntry::File { file, title, slug } => {
                let path = self.base_dir.join(file);
                self.add_file(path, title.as_deref(), slug.as_deref(), level, parent);
            }
            TocEntry::Pattern {
                pattern,
                title,
                slug,
            } => {
                let matches = self.expand(pattern)?;
                if matches.is_empty() {
                    tracing::warn!(pattern, "TOC pattern matched no files");
                }
                for path in matches {
                    self.add_file(path, title.as_deref(), slug.as_deref(), level, parent);
                }
            }
            TocEntry::Section {
                title,
                slug,
                children,
            } => {
                let title = title.clone().unwrap_or_else(|| UNTITLED.to_owned());
                let base = match slug {
                    Some(explicit) => explicit.clone(),
                    None => non_empty_or(slugify(&title), SECTION_SLUG),
                };
                let idx = self.add_page(PathBuf::new(), title, &base, level, parent);
                self.visit_entries(children, level + 1, Some(idx))?;
            }
            TocEntry::Url { url } => {
                tracing::debug!(url, "Skipping external TOC entry");
            }
        }
        Ok(())
    }

    /// Expand a glob relative to the base directory, sorted lexically.
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, TocError> {
        let base = Pattern::escape(&self.base_dir.to_string_lossy());
        let full = format!("{}/{pattern}", base.trim_end_matches('/'));
        let paths = glob::glob(&full).map_err(|source| TocError::Pattern {
            pattern: pattern.to_owned(),
            source,
        })?;

        let mut matches: Vec<PathBuf> = paths
            .filter_map(|entry| {
                entry
                    .inspect_err(|e| tracing::warn!(pattern, error = %e, "Skipping unreadable glob match"))
                    .ok()
            })
            .filter(|path| path.is_file())
            .collect();
        matches.sort();
        Ok(matches)
    }

    fn add_file(
        &mut self,
        path: PathBuf,
        title: Option<&str>,
        slug: Option<&str>,
        level: usize,
        parent: Option<usize>,
    ) {
        let title = title
            .map(str::to_owned)
            .or_else(|| extract_title(&path))
            .unwrap_or_else(|| title_from_path(&path));
        let base = match slug {
            Some(explicit) => explicit.to_owned(),
            None => non_empty_or(slug_from_path(&path), PAGE_SLUG),
        };
        self.add_page(path, title, &base, level, parent);
    }

    /// Register a page and link it to its parent. Returns its index.
    fn add_page(
        &mut self,
        path: PathBuf,
        title: String,
        base_slug: &str,
        level: usize,
        parent: Option<usize>,
    ) -> usize {
        let slug = self.unique_slug(base_slug);
        let idx = self.pages.len();
        let order = self.next_order;
        self.next_order += 1;

        tracing::debug!(slug, order, level, path = %path.display(), "Registered page");

        let parent_slug = parent.map(|p| {
            self.pages[p].children.push(slug.clone());
            self.pages[p].slug.clone()
        });

        self.slugs.insert(slug.clone(), idx);
        self.pages.push(Page {
            path,
            title,
            slug,
            level,
            parent: parent_slug,
            children: Vec::new(),
            order,
        });
        idx
    }

    fn unique_slug(&self, base: &str) -> String {
        if !self.slugs.contains_key(base) {
            return base.to_owned();
        }
        let slug = (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.slugs.contains_key(candidate))
            .unwrap_or_default();
        tracing::warn!(slug = base, renamed = %slug, "Duplicate slug, renamed page");
        slug
    }
}

fn non_empty_or(slug: String, fallback: &str) -> String {
    if slug.is_empty() {
        fallback.to_owned()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn build(yaml: &str, base_dir: &Path) -> Vec<Page> {
        let config = TocConfig::from_yaml(yaml, Path::new("myst.yml")).unwrap();
        build_pages(&config, base_dir).unwrap()
    }

    fn slugs(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn test_file_entry_explicit_title() {
        let pages = build(
            "project:\n  toc:\n    - file: a/b.md\n      title: B\n",
            Path::new("/x"),
        );

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].path, PathBuf::from("/x/a/b.md"));
        assert_eq!(pages[0].title, "B");
        assert_eq!(pages[0].slug, "b");
        assert_eq!(pages[0].level, 0);
        assert_eq!(pages[0].parent, None);
        assert_eq!(pages[0].order, 0);
    }

    #[test]
    fn test_section_order_and_levels() {
        let yaml = r"
project:
  toc:
    - file: index.md
    - title: Guide
      children:
        - file: intro.md
";
        let pages = build(yaml, Path::new("/x"));

        assert_eq!(slugs(&pages), vec!["index", "guide", "intro"]);
        assert_eq!(
            pages.iter().map(|p| p.order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(pages[1].parent, None);
        assert!(pages[1].is_section());
        assert_eq!(pages[1].children, vec!["intro".to_owned()]);
        assert_eq!(pages[2].parent.as_deref(), Some("guide"));
        assert_eq!(pages[2].level, 1);
    }

    #[test]
    fn test_order_is_depth_first() {
        let yaml = r"
project:
  toc:
    - title: A
      children:
        - title: A1
          children:
            - file: deep.md
        - file: a2.md
    - file: b.md
";
        let pages = build(yaml, Path::new("/x"));

        assert_eq!(slugs(&pages), vec!["a", "a1", "deep", "a2", "b"]);
        assert_eq!(pages[2].level, 2);
        assert_eq!(pages[3].parent.as_deref(), Some("a"));
        assert_eq!(pages[0].children, vec!["a1".to_owned(), "a2".to_owned()]);
    }

    #[test]
    fn test_title_from_first_h1() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("setup.md"),
            "---\ntitle: ignored\n# not a heading\n---\nIntro\n\n# Installing Things\n\n## Sub\n",
        )
        .unwrap();

        let pages = build("project:\n  toc:\n    - file: setup.md\n", dir.path());

        assert_eq!(pages[0].title, "Installing Things");
    }

    #[test]
    fn test_title_falls_back_to_basename_for_missing_file() {
        let pages = build(
            "project:\n  toc:\n    - file: docs/Release_Notes.md\n",
            Path::new("/nonexistent"),
        );

        assert_eq!(pages[0].title, "Release_Notes");
        assert_eq!(pages[0].slug, "release-notes");
    }

    #[test]
    fn test_explicit_slug_used() {
        let pages = build(
            "project:\n  toc:\n    - file: a.md\n      slug: custom\n",
            Path::new("/x"),
        );

        assert_eq!(pages[0].slug, "custom");
    }

    #[test]
    fn test_duplicate_slugs_get_numeric_suffix() {
        let yaml = r"
project:
  toc:
    - file: one/intro.md
    - file: two/intro.md
    - file: three/intro.md
";
        let pages = build(yaml, Path::new("/x"));

        assert_eq!(slugs(&pages), vec!["intro", "intro-2", "intro-3"]);
    }

    #[test]
    fn test_suffix_skips_taken_candidates() {
        let yaml = r"
project:
  toc:
    - file: intro-2.md
    - file: a/intro.md
    - file: b/intro.md
";
        let pages = build(yaml, Path::new("/x"));

        assert_eq!(slugs(&pages), vec!["intro-2", "intro", "intro-3"]);
    }

    #[test]
    fn test_untitled_section_slug_fallback() {
        let yaml = r"
project:
  toc:
    - title: '!!!'
      children:
        - file: a.md
    - children:
        - file: b.md
";
        let pages = build(yaml, Path::new("/x"));

        assert_eq!(slugs(&pages), vec!["section", "a", "untitled", "b"]);
        assert_eq!(pages[2].title, "Untitled");
    }

    #[test]
    fn test_pattern_expansion_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let topics = dir.path().join("topics");
        fs::create_dir_all(topics.join("nested.md")).unwrap();
        for name in ["zeta.md", "alpha.md", "mid.md", "notes.txt"] {
            fs::write(topics.join(name), "text").unwrap();
        }
        let yaml = r"
project:
  toc:
    - title: Topics
      children:
        - pattern: topics/*.md
";
        let pages = build(yaml, dir.path());

        assert_eq!(slugs(&pages), vec!["topics", "alpha", "mid", "zeta"]);
        assert!(pages[1..].iter().all(|p| p.level == 1));
        assert_eq!(pages[1].path, topics.join("alpha.md"));
        assert_eq!(
            pages[0].children,
            vec!["alpha".to_owned(), "mid".to_owned(), "zeta".to_owned()]
        );
    }

    #[test]
    fn test_pattern_with_shared_slug_is_disambiguated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# A").unwrap();
        fs::write(dir.path().join("b.md"), "# B").unwrap();

        let pages = build(
            "project:\n  toc:\n    - pattern: '*.md'\n      slug: shared\n",
            dir.path(),
        );

        assert_eq!(slugs(&pages), vec!["shared", "shared-2"]);
        assert_eq!(pages[0].title, "A");
    }

    #[test]
    fn test_pattern_without_matches_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let pages = build("project:\n  toc:\n    - pattern: 'missing/*.md'\n", dir.path());

        assert!(pages.is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let config =
            TocConfig::from_yaml("project:\n  toc:\n    - pattern: 'a[.md'\n", Path::new("myst.yml"))
                .unwrap();

        let err = build_pages(&config, Path::new("/x")).unwrap_err();

        assert!(matches!(err, TocError::Pattern { .. }));
    }

    #[test]
    fn test_url_entries_are_skipped() {
        let pages = build(
            "project:\n  toc:\n    - url: https://example.com\n    - file: a.md\n",
            Path::new("/x"),
        );

        assert_eq!(slugs(&pages), vec!["a"]);
        assert_eq!(pages[0].order, 0);
    }

    #[test]
    fn test_strip_front_matter() {
        assert_eq!(strip_front_matter("---\na: 1\n---\n# T\n"), "# T\n");
        assert_eq!(strip_front_matter("# T\n"), "# T\n");
        assert_eq!(strip_front_matter("---\nunterminated"), "---\nunterminated");
    }

    #[test]
    fn test_strip_front_matter_requires_exact_delimiter() {
        let content = "---\nrule: ----\n---foo: bar\n---\n# T\n";

        assert_eq!(strip_front_matter(content), "# T\n");
    }

    #[test]
    fn test_strip_front_matter_crlf() {
        assert_eq!(strip_front_matter("---\r\na: 1\r\n---\r\n# T\r\n"), "# T\r\n");
    }

    #[test]
    fn test_title_from_crlf_front_matter() {
        let content = "---\r\n# comment\r\n---\r\n# Real Title\r\n";

        assert_eq!(title_from_content(content).as_deref(), Some("Real Title"));
    }

    #[test]
    fn test_bare_hash_line_is_not_a_title() {
        assert_eq!(title_from_content("#\n\nJust a paragraph\n"), None);
    }

    #[test]
    fn test_heading_inside_code_fence_ignored() {
        let backticks = "Intro\n\n```bash\n# install deps\nmake\n```\n";
        let tildes = "~~~\n# not a title\n~~~\n\n# After Fence\n";

        assert_eq!(title_from_content(backticks), None);
        assert_eq!(title_from_content(tildes).as_deref(), Some("After Fence"));
    }

    #[test]
    fn test_fenced_heading_falls_back_to_basename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setup.md"), "```sh\n# install deps\n```\n").unwrap();

        let pages = build("project:\n  toc:\n    - file: setup.md\n", dir.path());

        assert_eq!(pages[0].title, "setup");
    }
}
