//! Page structure, cross-references and navigation for mystpub.
//!
//! This crate provides:
//! - [`build_structure`]: TOC description → [`PageStructure`] with slugs,
//!   traversal order and hierarchy indices
//! - [`Site`]: structure plus the per-page cross-reference cache
//! - [`ReferenceResolver`]: classification and resolution of `{ref}`,
//!   `{cite}` and `{doc}` role tokens
//! - [`navigation`]: breadcrumbs, previous/next, child listings and the site
//!   menu, with Confluence storage renderers
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use mystpub_site::{Site, navigation};
//!
//! let site = Site::load(Path::new("docs/myst.yml"), Path::new("docs"))?;
//!
//! for page in site.structure().pages() {
//!     let trail = navigation::breadcrumbs(site.structure(), &page.slug);
//!     println!("{} ({} levels)", page.slug, trail.len());
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
pub mod navigation;
mod page;
mod site;
mod slug;
mod structure;
mod toc;
mod xref;

pub use error::TocError;
pub use navigation::{ChildItem, MenuItem, NavLink, PrevNext};
pub use page::Page;
pub use site::Site;
pub use slug::{slug_from_path, slugify};
pub use structure::{PageStructure, build_structure};
pub use toc::{TocConfig, TocEntry};
pub use xref::{CrossReference, REFERENCE_ROLES, ReferenceKind, ReferenceResolver, classify};
