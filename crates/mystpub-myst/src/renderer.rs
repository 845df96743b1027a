//! Confluence storage format rendering.
//!
//! Produces Confluence XHTML storage format from a parsed [`Document`]:
//! - `ac:structured-macro` for code blocks, admonitions and math
//! - `ac:link` with `ri:page` for links to other published pages
//! - Title handling: the first H1 is dropped when it duplicates the page title

use std::fmt::Write;

use crate::ast::{Document, Node, NodeKind};

/// Resolved target of a role node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Link {
    /// Another page in the published set.
    Page {
        /// Title of the target page.
        title: String,
    },
    /// External or literal URL.
    Url(String),
}

/// Resolves role nodes to link targets while rendering.
pub trait LinkResolver {
    /// Resolve `token` written in a role named `role`.
    ///
    /// Returning `None` renders the token as plain text.
    fn resolve_link(&self, role: &str, token: &str) -> Option<Link>;
}

/// Resolver that never resolves anything.
pub struct NoLinks;

impl LinkResolver for NoLinks {
    fn resolve_link(&self, _role: &str, _token: &str) -> Option<Link> {
        None
    }
}

/// Escape special characters for XHTML text and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Renders documents to Confluence storage format.
pub struct StorageRenderer<'a> {
    links: &'a dyn LinkResolver,
    title: Option<&'a str>,
}

impl<'a> StorageRenderer<'a> {
    /// Create a renderer using `links` for role resolution.
    #[must_use]
    pub fn new(links: &'a dyn LinkResolver) -> Self {
        Self { links, title: None }
    }

    /// Drop a leading H1 whose text equals `title`.
    ///
    /// Confluence shows the page title above the body already.
    #[must_use]
    pub fn page_title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    /// Render a document.
    #[must_use]
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        let children = &document.root().children;

        let skip_title = match (self.title, children.first()) {
            (Some(title), Some(first)) => {
                first.kind == (NodeKind::Heading { depth: 1 }) && first.plain_text().trim() == title
            }
            _ => false,
        };

        for child in &children[usize::from(skip_title)..] {
            self.node(child, &mut out);
        }
        out
    }

    fn children(&self, node: &Node, out: &mut String) {
        for child in &node.children {
            self.node(child, out);
        }
    }

    fn wrap(&self, tag: &str, node: &Node, out: &mut String) {
        write!(out, "<{tag}>").unwrap();
        self.children(node, out);
        write!(out, "</{tag}>").unwrap();
    }

    fn node(&self, node: &Node, out: &mut String) {
        let value = node.value.as_deref().unwrap_or_default();
        match &node.kind {
            NodeKind::Root | NodeKind::Other { .. } => {
                if node.children.is_empty() {
                    out.push_str(&escape_html(value));
                } else {
                    self.children(node, out);
                }
            }
            NodeKind::Heading { depth } => self.wrap(&format!("h{depth}"), node, out),
            NodeKind::Paragraph => self.wrap("p", node, out),
            NodeKind::Text => out.push_str(&escape_html(value)),
            NodeKind::Emphasis => self.wrap("em", node, out),
            NodeKind::Strong => self.wrap("strong", node, out),
            NodeKind::InlineCode => {
                write!(out, "<code>{}</code>", escape_html(value)).unwrap();
            }
            NodeKind::Code { lang } => Self::code_block(lang.as_deref(), value, out),
            NodeKind::List { ordered } => self.wrap(if *ordered { "ol" } else { "ul" }, node, out),
            NodeKind::ListItem => self.wrap("li", node, out),
            NodeKind::Link { url } => {
                write!(out, r#"<a href="{}">"#, escape_html(url)).unwrap();
                self.children(node, out);
                out.push_str("</a>");
            }
            NodeKind::Role { name } => self.role(name, node, out),
            NodeKind::Directive { name, args, .. } => {
                self.directive(name, args.as_deref(), node, out);
            }
            NodeKind::Math => Self::macro_body("mathblock", value, out),
            NodeKind::InlineMath => Self::macro_body("mathinline", value, out),
            NodeKind::Table => self.wrap("table", node, out),
            NodeKind::TableRow => self.wrap("tr", node, out),
            NodeKind::TableCell => self.wrap("td", node, out),
            NodeKind::Blockquote => self.wrap("blockquote", node, out),
            NodeKind::ThematicBreak => out.push_str("<hr />"),
            NodeKind::Break => out.push_str("<br />"),
        }
    }

    fn role(&self, name: &str, node: &Node, out: &mut String) {
        let Some(token) = node.literal() else {
            return;
        };
        match self.links.resolve_link(name, token) {
            Some(Link::Page { title }) => {
                write!(
                    out,
                    r#"<ac:link><ri:page ri:content-title="{}" /><ac:plain-text-link-body><![CDATA[{title}]]></ac:plain-text-link-body></ac:link>"#,
                    escape_html(&title)
                )
                .unwrap();
            }
            Some(Link::Url(url)) => {
                let url = escape_html(&url);
                write!(out, r#"<a href="{url}">{url}</a>"#).unwrap();
            }
            None => out.push_str(&escape_html(token)),
        }
    }

    fn directive(&self, name: &str, args: Option<&str>, node: &Node, out: &mut String) {
        let panel = match name {
            "note" | "seealso" => Some("info"),
            "tip" | "hint" => Some("tip"),
            "warning" | "caution" | "danger" | "error" | "attention" => Some("warning"),
            "important" | "admonition" => Some("note"),
            _ => None,
        };

        match (panel, name) {
            (Some(panel), _) => {
                write!(
                    out,
                    r#"<ac:structured-macro ac:name="{panel}" ac:schema-version="1">"#
                )
                .unwrap();
                if let Some(title) = args.filter(|a| !a.is_empty()) {
                    write!(
                        out,
                        r#"<ac:parameter ac:name="title">{}</ac:parameter>"#,
                        escape_html(title)
                    )
                    .unwrap();
                }
                out.push_str("<ac:rich-text-body>");
                self.children(node, out);
                out.push_str("</ac:rich-text-body></ac:structured-macro>");
            }
            (None, "code" | "code-block" | "code-cell") => {
                let value = node.value.as_deref().unwrap_or_default();
                Self::code_block(args, value, out);
            }
            (None, "math") => {
                Self::macro_body("mathblock", node.value.as_deref().unwrap_or_default(), out);
            }
            _ => self.children(node, out),
        }
    }

    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
        if let Some(lang) = lang {
            write!(
                out,
                r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
                escape_html(lang)
            )
            .unwrap();
        }
        // CDATA content is not escaped
        write!(
            out,
            r"<ac:plain-text-body><![CDATA[{content}]]></ac:plain-text-body>"
        )
        .unwrap();
        out.push_str("</ac:structured-macro>");
    }

    fn macro_body(name: &str, content: &str, out: &mut String) {
        write!(
            out,
            r#"<ac:structured-macro ac:name="{name}" ac:schema-version="1"><ac:plain-text-body><![CDATA[{content}]]></ac:plain-text-body></ac:structured-macro>"#
        )
        .unwrap();
    }
}
