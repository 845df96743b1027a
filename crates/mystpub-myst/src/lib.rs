//! MyST document handling for mystpub.
//!
//! This crate provides:
//! - [`Document`] / [`Node`]: closed model of the parser's JSON tree with a
//!   depth-first [`Visitor`]
//! - [`DocumentParser`]: bridge to the external MyST parser
//! - [`StorageRenderer`]: Confluence storage format rendering

mod ast;
mod parser;
mod renderer;

pub use ast::{Document, Node, NodeKind, Visitor};
pub use parser::{CommandParser, DocumentParser, JsonFileParser, ParseError};
pub use renderer::{Link, LinkResolver, NoLinks, StorageRenderer, escape_html};
