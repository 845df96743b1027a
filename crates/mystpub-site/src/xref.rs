//! Cross-reference resolution.
//!
//! Role nodes named `ref`, `cite` or `doc` carry a token pointing at another
//! page or an external resource. Tokens are classified by shape (first rule
//! wins):
//!
//! 1. `#anchor` resolves iff `anchor` is a known slug
//! 2. `http...` is an external URL and always resolves
//! 3. Tokens containing `/` or `\`, or ending in `.md`, are file paths and
//!    resolve through the file stem slug
//! 4. Anything else is matched against page titles and slugs in traversal
//!    order
//!
//! Resolution never fails. Unresolved references are logged and rendered as
//! plain text.

use std::path::Path;

use mystpub_myst::{Document, Link, LinkResolver, Node, Visitor};
use serde::Serialize;

use crate::page::Page;
use crate::slug::slug_from_path;
use crate::structure::PageStructure;

/// Role names that carry cross-references.
pub const REFERENCE_ROLES: [&str; 3] = ["ref", "cite", "doc"];

/// How a reference token was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `#slug` anchor inside the site.
    Anchor,
    /// Absolute `http(s)` URL.
    External,
    /// Path to a content file.
    File,
    /// Free text matched against page titles and slugs.
    TitleOrSlug,
}

/// Reference found in a document together with its resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    /// Role name the token was written in.
    pub role: String,
    /// Token as written.
    pub token: String,
    /// Classification of the token.
    pub kind: ReferenceKind,
    /// Whether the token points at something that exists.
    pub resolved: bool,
    /// Link target: the token for anchors (resolved or not) and URLs,
    /// `#slug` for resolved file and title references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Slug of the target page for internal references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_slug: Option<String>,
    /// Title of the target page for internal references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_title: Option<String>,
}

impl CrossReference {
    /// Text shown for the link: the target page title when known, the token
    /// otherwise.
    #[must_use]
    pub fn link_text(&self) -> &str {
        self.target_title.as_deref().unwrap_or(&self.token)
    }

    fn unresolved(role: &str, token: &str, kind: ReferenceKind) -> Self {
        Self {
            role: role.to_owned(),
            token: token.to_owned(),
            kind,
            resolved: false,
            target: None,
            target_slug: None,
            target_title: None,
        }
    }

    fn page(role: &str, token: &str, kind: ReferenceKind, target: String, page: &Page) -> Self {
        Self {
            role: role.to_owned(),
            token: token.to_owned(),
            kind,
            resolved: true,
            target: Some(target),
            target_slug: Some(page.slug.clone()),
            target_title: Some(page.title.clone()),
        }
    }
}

/// Classify a token without resolving it.
#[must_use]
pub fn classify(token: &str) -> ReferenceKind {
    if token.starts_with('#') {
        ReferenceKind::Anchor
    } else if token.starts_with("http") {
        ReferenceKind::External
    } else if token.contains('/') || token.contains('\\') || token.ends_with(".md") {
        ReferenceKind::File
    } else {
        ReferenceKind::TitleOrSlug
    }
}

fn internal(role: &str, token: &str, kind: ReferenceKind, page: Option<&Page>) -> CrossReference {
    match page {
        Some(page) => CrossReference::page(role, token, kind, format!("#{}", page.slug), page),
        None => CrossReference::unresolved(role, token, kind),
    }
}

/// Resolves reference tokens against a page structure.
#[derive(Clone, Copy)]
pub struct ReferenceResolver<'a> {
    structure: &'a PageStructure,
}

impl<'a> ReferenceResolver<'a> {
    #[must_use]
    pub fn new(structure: &'a PageStructure) -> Self {
        Self { structure }
    }

    /// Resolve a single token written in role `role`.
    #[must_use]
    pub fn resolve(&self, role: &str, token: &str) -> CrossReference {
        let kind = classify(token);
        match kind {
            ReferenceKind::Anchor => {
                let slug = &token[1..];
                match self.structure.get_page(slug) {
                    Some(page) => CrossReference::page(role, token, kind, token.to_owned(), page),
                    None => CrossReference {
                        target: Some(token.to_owned()),
                        ..CrossReference::unresolved(role, token, kind)
                    },
                }
            }
            ReferenceKind::External => CrossReference {
                resolved: true,
                target: Some(token.to_owned()),
                ..CrossReference::unresolved(role, token, kind)
            },
            ReferenceKind::File => {
                let normalized = token.replace('\\', "/");
                let slug = slug_from_path(Path::new(&normalized));
                internal(role, token, kind, self.structure.get_page(&slug))
            }
            ReferenceKind::TitleOrSlug => {
                let page = self
                    .structure
                    .pages()
                    .iter()
                    .find(|page| page.title == token || page.slug == token);
                internal(role, token, kind, page)
            }
        }
    }

    /// Collect and resolve every reference role in a document, in document
    /// order.
    #[must_use]
    pub fn collect(&self, document: &Document) -> Vec<CrossReference> {
        struct Collect<'r, 'a> {
            resolver: &'r ReferenceResolver<'a>,
            found: Vec<CrossReference>,
        }

        impl Visitor for Collect<'_, '_> {
            fn visit(&mut self, node: &Node) -> bool {
                if let Some(role) = node.role_name().filter(|name| REFERENCE_ROLES.contains(name))
                    && let Some(token) = node.literal()
                {
                    self.found.push(self.resolver.resolve(role, token));
                }
                true
            }
        }

        let mut collect = Collect {
            resolver: self,
            found: Vec::new(),
        };
        document.walk(&mut collect);
        collect.found
    }
}

impl LinkResolver for ReferenceResolver<'_> {
    fn resolve_link(&self, role: &str, token: &str) -> Option<Link> {
        if !REFERENCE_ROLES.contains(&role) {
            return None;
        }
        let reference = self.resolve(role, token);
        if !reference.resolved {
            return None;
        }
        match reference.kind {
            ReferenceKind::External => reference.target.map(Link::Url),
            _ => reference.target_title.map(|title| Link::Page { title }),
        }
    }
}
