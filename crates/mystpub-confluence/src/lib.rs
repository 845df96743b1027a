//! Confluence publishing for mystpub.
//!
//! This crate provides:
//! - [`ConfluenceClient`]: sync REST client (find, create, update pages)
//! - [`PageSink`]: publishing target, implemented by [`ConfluenceSink`] and
//!   [`DryRunSink`]
//! - [`SitePublisher`]: renders every page of a [`mystpub_site::Site`] and
//!   publishes it, collecting a [`PublishReport`]
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::{Path, PathBuf};
//! use mystpub_confluence::{DryRunSink, SitePublisher};
//! use mystpub_myst::JsonFileParser;
//! use mystpub_site::Site;
//!
//! let site = Site::load(Path::new("docs/myst.yml"), Path::new("docs"))?;
//! let parser = JsonFileParser::new(PathBuf::from("docs"));
//! let mut sink = DryRunSink::new();
//!
//! let report = SitePublisher::new(&site, &parser).publish_all(&mut sink);
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod publisher;
mod report;
mod sink;
pub mod types;

pub use client::ConfluenceClient;
pub use error::{ConfluenceError, PublishError};
pub use publisher::SitePublisher;
pub use report::{PageOutcome, PublishReport};
pub use sink::{ConfluenceSink, DryRunSink, PageSink, PublishPage, PublishedPage};
