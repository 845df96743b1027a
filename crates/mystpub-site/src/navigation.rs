//! Navigation views over a page structure.
//!
//! Pure functions computing breadcrumbs, previous/next links, child listings
//! and the site menu for a focal page, plus renderers producing Confluence
//! storage XHTML for each view.

use std::fmt::Write;

use mystpub_myst::escape_html;
use serde::Serialize;

use crate::page::Page;
use crate::structure::PageStructure;

/// Link to a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavLink {
    /// Display title.
    pub title: String,
    /// Target slug.
    pub slug: String,
}

impl From<&Page> for NavLink {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            slug: page.slug.clone(),
        }
    }
}

/// Previous and next pages among the focal page's siblings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PrevNext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<NavLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
}

impl PrevNext {
    /// True if there is neither a previous nor a next page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}

/// Entry of a child listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChildItem {
    pub title: String,
    pub slug: String,
    /// True if this child is the page being viewed.
    pub current: bool,
}

/// Site menu node with children for the full tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Display title.
    pub title: String,
    /// Target slug.
    pub slug: String,
    /// True if this item is the page being viewed.
    pub current: bool,
    /// Child menu items.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

/// Trail from a root page to `slug`, inclusive. Empty for unknown slugs.
#[must_use]
pub fn breadcrumbs(structure: &PageStructure, slug: &str) -> Vec<NavLink> {
    structure
        .breadcrumbs(slug)
        .into_iter()
        .map(NavLink::from)
        .collect()
}

/// Previous and next pages in the parent's child list.
///
/// Root pages and unknown slugs have neither.
#[must_use]
pub fn prev_next(structure: &PageStructure, slug: &str) -> PrevNext {
    let Some(parent) = structure.parent(slug) else {
        return PrevNext::default();
    };
    let Some(position) = parent.children.iter().position(|child| child == slug) else {
        return PrevNext::default();
    };

    let link = |i: usize| {
        parent
            .children
            .get(i)
            .and_then(|child| structure.get_page(child))
            .map(NavLink::from)
    };

    PrevNext {
        prev: position.checked_sub(1).and_then(link),
        next: link(position + 1),
    }
}

/// Direct children of `slug`, flagging the one equal to `current`.
#[must_use]
pub fn child_listing(structure: &PageStructure, slug: &str, current: Option<&str>) -> Vec<ChildItem> {
    structure
        .children(slug)
        .into_iter()
        .map(|child| ChildItem {
            title: child.title.clone(),
            slug: child.slug.clone(),
            current: current == Some(child.slug.as_str()),
        })
        .collect()
}

/// Full menu tree from the root pages down, flagging `current`.
#[must_use]
pub fn site_menu(structure: &PageStructure, current: Option<&str>) -> Vec<MenuItem> {
    fn item(structure: &PageStructure, page: &Page, current: Option<&str>) -> MenuItem {
        MenuItem {
            title: page.title.clone(),
            slug: page.slug.clone(),
            current: current == Some(page.slug.as_str()),
            children: structure
                .children(&page.slug)
                .into_iter()
                .map(|child| item(structure, child, current))
                .collect(),
        }
    }

    structure
        .root_pages()
        .into_iter()
        .map(|page| item(structure, page, current))
        .collect()
}

/// Confluence link to the page titled `title`.
///
/// Only the attribute is escaped; the link body is CDATA and kept verbatim.
fn page_link(out: &mut String, title: &str) {
    write!(
        out,
        r#"<ac:link><ri:page ri:content-title="{}" /><ac:plain-text-link-body><![CDATA[{title}]]></ac:plain-text-link-body></ac:link>"#,
        escape_html(title)
    )
    .unwrap();
}

/// Render a breadcrumb trail as a paragraph of links.
///
/// Renders nothing for trails with a single entry.
#[must_use]
pub fn render_breadcrumbs(trail: &[NavLink]) -> String {
    if trail.len() <= 1 {
        return String::new();
    }
    let mut out = String::from(r#"<p class="breadcrumbs">"#);
    for (i, item) in trail.iter().enumerate() {
        if i > 0 {
            out.push_str(" &gt; ");
        }
        if i + 1 == trail.len() {
            out.push_str(&escape_html(&item.title));
        } else {
            page_link(&mut out, &item.title);
        }
    }
    out.push_str("</p>");
    out
}

/// Render previous/next links. Renders nothing when both are absent.
#[must_use]
pub fn render_prev_next(links: &PrevNext) -> String {
    if links.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<p class="prev-next">"#);
    if let Some(prev) = &links.prev {
        out.push_str("&larr; ");
        page_link(&mut out, &prev.title);
    }
    if let Some(next) = &links.next {
        if links.prev.is_some() {
            out.push_str(" | ");
        }
        page_link(&mut out, &next.title);
        out.push_str(" &rarr;");
    }
    out.push_str("</p>");
    out
}

/// Render a child listing as a bullet list. The current entry is bold.
#[must_use]
pub fn render_children(items: &[ChildItem]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul>");
    for item in items {
        out.push_str("<li>");
        if item.current {
            write!(out, "<strong>{}</strong>", escape_html(&item.title)).unwrap();
        } else {
            page_link(&mut out, &item.title);
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

/// Render the site menu as nested bullet lists.
#[must_use]
pub fn render_menu(items: &[MenuItem]) -> String {
    fn render_items(items: &[MenuItem], out: &mut String) {
        out.push_str("<ul>");
        for item in items {
            out.push_str("<li>");
            if item.current {
                write!(out, "<strong>{}</strong>", escape_html(&item.title)).unwrap();
            } else {
                page_link(out, &item.title);
            }
            if !item.children.is_empty() {
                render_items(&item.children, out);
            }
            out.push_str("</li>");
        }
        out.push_str("</ul>");
    }

    let mut out = String::new();
    if !items.is_empty() {
        render_items(items, &mut out);
    }
    out
}
