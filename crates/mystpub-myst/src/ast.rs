//! Parsed MyST document model.
//!
//! The MyST parser emits an mdast-style JSON tree where every node carries a
//! `type` tag and type-specific fields. The tree is deserialized into an
//! intermediate [`RawNode`] record and converted into [`Node`], whose
//! [`NodeKind`] is a closed set of variants. Node types this crate does not
//! model keep their tag in [`NodeKind::Other`] so traversal still reaches
//! their children.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Node kind with type-specific fields.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Document root.
    Root,
    /// Heading with depth 1-6.
    Heading {
        /// Heading level.
        depth: u8,
    },
    Paragraph,
    /// Leaf text.
    Text,
    Emphasis,
    Strong,
    InlineCode,
    /// Fenced code block.
    Code {
        /// Language from the fence info string.
        lang: Option<String>,
    },
    List {
        /// True for numbered lists.
        ordered: bool,
    },
    ListItem,
    Link {
        /// Link destination.
        url: String,
    },
    /// Inline role such as `{ref}` or `{doc}`.
    Role {
        /// Role name without braces.
        name: String,
    },
    /// Block directive such as `{note}` or `{figure}`.
    Directive {
        /// Directive name without braces.
        name: String,
        /// Argument string following the directive name.
        args: Option<String>,
        /// Directive options.
        options: BTreeMap<String, serde_json::Value>,
    },
    Math,
    InlineMath,
    Table,
    TableRow,
    TableCell,
    Blockquote,
    ThematicBreak,
    Break,
    /// Any node type not modeled above.
    Other {
        /// Original `type` tag.
        kind: String,
    },
}

/// Node in a parsed document.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Node kind.
    pub kind: NodeKind,
    /// Literal value for leaf nodes (text, code, math, roles).
    pub value: Option<String>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

/// Depth-first visitor over a node tree.
///
/// `visit` is called in pre-order. Returning `false` skips the node's children.
pub trait Visitor {
    fn visit(&mut self, node: &Node) -> bool;
}

impl Node {
    /// Create a node without value or children.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            value: None,
            children: Vec::new(),
        }
    }

    /// Create a text leaf.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Set the literal value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Walk this node and all descendants depth-first.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit(self) {
            for child in &self.children {
                child.walk(visitor);
            }
        }
    }

    /// Literal value of this node, falling back to the first child's value.
    ///
    /// Roles written as ``{ref}`target` `` carry the target either directly
    /// or in a single text child depending on the parser version.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        self.value
            .as_deref()
            .or_else(|| self.children.first().and_then(|c| c.value.as_deref()))
    }

    /// Concatenated text of all descendant leaves.
    #[must_use]
    pub fn plain_text(&self) -> String {
        struct Collect(String);
        impl Visitor for Collect {
            fn visit(&mut self, node: &Node) -> bool {
                if node.children.is_empty()
                    && let Some(value) = &node.value
                {
                    self.0.push_str(value);
                }
                true
            }
        }

        let mut collect = Collect(String::new());
        self.walk(&mut collect);
        collect.0
    }

    /// Role name if this node is a role.
    #[must_use]
    pub fn role_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Role { name } => Some(name),
            _ => None,
        }
    }
}

/// Parsed document.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Wrap a root node.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Deserialize a document from parser JSON output.
    ///
    /// Accepts either a bare root node or a page object with the tree under
    /// `mdast`, as written by MyST build output.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the input is not a node tree.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawDocument = serde_json::from_str(json)?;
        let root = match raw {
            RawDocument::Page { mdast } => mdast,
            RawDocument::Tree(node) => node,
        };
        Ok(Self::new(root.into()))
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Walk the whole document depth-first.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.root.walk(visitor);
    }

    /// Text of the first level-1 heading.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        struct FindTitle(Option<String>);
        impl Visitor for FindTitle {
            fn visit(&mut self, node: &Node) -> bool {
                if self.0.is_some() {
                    return false;
                }
                if node.kind == (NodeKind::Heading { depth: 1 }) {
                    self.0 = Some(node.plain_text().trim().to_owned());
                    return false;
                }
                true
            }
        }

        let mut finder = FindTitle(None);
        self.walk(&mut finder);
        finder.0.filter(|t| !t.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Page { mdast: RawNode },
    Tree(RawNode),
}

/// Node record as emitted by the parser.
#[derive(Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    children: Vec<RawNode>,
    #[serde(default)]
    depth: Option<u8>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    ordered: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    args: Option<String>,
    #[serde(default)]
    options: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    url: Option<String>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let kind = match raw.kind.as_str() {
            "root" => NodeKind::Root,
            "heading" => NodeKind::Heading {
                depth: raw.depth.unwrap_or(1).clamp(1, 6),
            },
            "paragraph" => NodeKind::Paragraph,
            "text" => NodeKind::Text,
            "emphasis" => NodeKind::Emphasis,
            "strong" => NodeKind::Strong,
            "inlineCode" => NodeKind::InlineCode,
            "code" => NodeKind::Code { lang: raw.lang },
            "list" => NodeKind::List {
                ordered: raw.ordered.unwrap_or(false),
            },
            "listItem" => NodeKind::ListItem,
            "link" => NodeKind::Link {
                url: raw.url.unwrap_or_default(),
            },
            "mystRole" | "role" => NodeKind::Role {
                name: raw.name.unwrap_or_default(),
            },
            "mystDirective" | "directive" => NodeKind::Directive {
                name: raw.name.unwrap_or_default(),
                args: raw.args,
                options: raw.options.unwrap_or_default(),
            },
            "math" => NodeKind::Math,
            "inlineMath" => NodeKind::InlineMath,
            "table" => NodeKind::Table,
            "tableRow" => NodeKind::TableRow,
            "tableCell" => NodeKind::TableCell,
            "blockquote" => NodeKind::Blockquote,
            "thematicBreak" => NodeKind::ThematicBreak,
            "break" => NodeKind::Break,
            _ => NodeKind::Other { kind: raw.kind },
        };

        Self {
            kind,
            value: raw.value,
            children: raw.children.into_iter().map(Node::from).collect(),
        }
    }
}
