//! Slug derivation.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Normalize text into a slug.
///
/// Lower-cases the input, collapses every run of non-alphanumeric characters
/// into a single hyphen and strips leading and trailing hyphens.
///
/// # Examples
///
/// ```
/// use mystpub_site::slugify;
///
/// assert_eq!(slugify("My Page!!"), "my-page");
/// assert_eq!(slugify("getting_started"), "getting-started");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_owned()
}

/// Slug for a content file: the normalized file stem.
///
/// The directory part is ignored, so `user-guide/intro.md` and `intro.md`
/// share the slug `intro`.
#[must_use]
pub fn slug_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| slugify(&stem.to_string_lossy()))
        .unwrap_or_default()
}

/// Basename used as a fallback title for content files.
pub(crate) fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_punctuation() {
        assert_eq!(slugify("My Page!!"), "my-page");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("a  --  b"), "a-b");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
    }

    #[test]
    fn test_slugify_strips_edges() {
        assert_eq!(slugify("--Intro--"), "intro");
        assert_eq!(slugify("  spaced  "), "spaced");
    }

    #[test]
    fn test_slugify_only_punctuation_is_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let once = slugify("Release Notes (v2.0)");
        assert_eq!(once, "release-notes-v2-0");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn test_slug_from_path_ignores_directories() {
        assert_eq!(slug_from_path(Path::new("user-guide/intro.md")), "intro");
        assert_eq!(slug_from_path(Path::new("a/b.md")), "b");
    }

    #[test]
    fn test_slug_from_path_normalizes_stem() {
        assert_eq!(slug_from_path(Path::new("docs/Getting_Started.md")), "getting-started");
    }

    #[test]
    fn test_title_from_path_keeps_case() {
        assert_eq!(title_from_path(Path::new("docs/Getting_Started.md")), "Getting_Started");
    }
}
