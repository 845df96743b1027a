//! Site publisher.
//!
//! Walks the page structure in traversal order and, for each page:
//!
//! 1. Parses the content file (section headers have none)
//! 2. Resolves cross-references and caches them in the [`Site`]
//! 3. Renders the body with breadcrumbs, child listing and previous/next
//!    links
//! 4. Hands the result to a [`PageSink`]
//!
//! A failing page is logged and recorded; the remaining pages are still
//! published.

use std::time::Instant;

use mystpub_myst::{DocumentParser, StorageRenderer};
use mystpub_site::{Page, Site, navigation};

use crate::error::PublishError;
use crate::report::{PageOutcome, PublishReport};
use crate::sink::{PageSink, PublishPage};

/// Publishes every page of a site through a sink.
pub struct SitePublisher<'a> {
    site: &'a Site,
    parser: &'a dyn DocumentParser,
}

impl<'a> SitePublisher<'a> {
    #[must_use]
    pub fn new(site: &'a Site, parser: &'a dyn DocumentParser) -> Self {
        Self { site, parser }
    }

    /// Publish all pages in traversal order.
    ///
    /// Never fails as a whole; per-page failures end up in the report.
    pub fn publish_all(&self, sink: &mut dyn PageSink) -> PublishReport {
        let start = Instant::now();
        let mut report = PublishReport::default();

        for page in self.site.structure().pages() {
            let outcome = match self.publish_page(page, sink) {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::error!(slug = %page.slug, error = %error, "Failed to publish page");
                    PageOutcome::Failed(error)
                }
            };
            report.record(page.slug.clone(), outcome);
        }

        tracing::info!(
            published = report.succeeded(),
            failed = report.len() - report.succeeded(),
            unresolved = report.unresolved_count(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Publish finished"
        );
        report
    }

    fn publish_page(&self, page: &Page, sink: &mut dyn PageSink) -> Result<PageOutcome, PublishError> {
        let (prepared, unresolved) = self.prepare(page)?;
        let published = sink
            .publish(&prepared)
            .map_err(|source| PublishError::Confluence {
                title: prepared.title.clone(),
                source,
            })?;

        tracing::debug!(slug = %page.slug, id = %published.id, "Published page");
        Ok(PageOutcome::Published {
            page: published,
            unresolved,
        })
    }

    /// Render a page without publishing it.
    ///
    /// Returns the rendered page and the tokens of unresolved references.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Parse`] if the content file cannot be parsed.
    pub fn prepare(&self, page: &Page) -> Result<(PublishPage, Vec<String>), PublishError> {
        let structure = self.site.structure();
        let mut body = navigation::render_breadcrumbs(&navigation::breadcrumbs(structure, &page.slug));
        let mut unresolved = Vec::new();

        if let Some(path) = page.content_path() {
            let document = self.parser.parse(path).map_err(|source| PublishError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

            unresolved = self
                .site
                .process_cross_references(&document, &page.slug)
                .into_iter()
                .filter(|reference| !reference.resolved)
                .map(|reference| reference.token)
                .collect();

            let resolver = self.site.resolver();
            body.push_str(
                &StorageRenderer::new(&resolver)
                    .page_title(&page.title)
                    .render(&document),
            );
        }

        body.push_str(&navigation::render_children(&navigation::child_listing(
            structure, &page.slug, None,
        )));
        body.push_str(&navigation::render_prev_next(&navigation::prev_next(
            structure, &page.slug,
        )));

        let prepared = PublishPage {
            slug: page.slug.clone(),
            title: page.title.clone(),
            content: body,
            metadata: structure.metadata(&page.slug).unwrap_or_default(),
            parent_slug: page.parent.clone(),
        };
        Ok((prepared, unresolved))
    }
}
