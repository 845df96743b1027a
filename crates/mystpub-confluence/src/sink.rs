//! Publishing targets.
//!
//! [`PageSink`] receives fully rendered pages in traversal order, so a
//! page's parent is always published before the page itself.

use std::collections::{BTreeMap, HashMap};

use mystpub_config::ConfluenceConfig;

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;

/// Rendered page ready for publishing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishPage {
    /// Slug of the page in the site structure.
    pub slug: String,
    /// Page title.
    pub title: String,
    /// Body in Confluence storage format.
    pub content: String,
    /// Page metadata (order, position, level, parent).
    pub metadata: BTreeMap<String, String>,
    /// Slug of the parent page, `None` for root pages.
    pub parent_slug: Option<String>,
}

/// Result of publishing one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedPage {
    /// Identifier assigned by the target.
    pub id: String,
    /// Web URL of the page, if the target has one.
    pub url: Option<String>,
}

/// Destination for rendered pages.
pub trait PageSink {
    /// Publish one page.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the target rejects the page.
    fn publish(&mut self, page: &PublishPage) -> Result<PublishedPage, ConfluenceError>;
}

/// Publishes pages to a Confluence space.
///
/// Pages are matched by title: an existing page is updated with the next
/// version number, otherwise a new page is created. New pages are created
/// under their parent's Confluence page when the parent was published in the
/// same run, and under the configured parent page otherwise.
pub struct ConfluenceSink<'a> {
    client: &'a ConfluenceClient,
    space_key: String,
    root_parent_id: Option<String>,
    version_message: String,
    published: HashMap<String, String>,
}

impl<'a> ConfluenceSink<'a> {
    /// Create a sink writing through `client` into the configured space.
    #[must_use]
    pub fn new(client: &'a ConfluenceClient, config: &ConfluenceConfig) -> Self {
        Self {
            client,
            space_key: config.space_key.clone(),
            root_parent_id: config.parent_page_id.clone(),
            version_message: config.version_message.clone(),
            published: HashMap::new(),
        }
    }

    fn parent_id(&self, page: &PublishPage) -> Option<&str> {
        page.parent_slug
            .as_ref()
            .and_then(|slug| self.published.get(slug))
            .or(self.root_parent_id.as_ref())
            .map(String::as_str)
    }
}

impl PageSink for ConfluenceSink<'_> {
    fn publish(&mut self, page: &PublishPage) -> Result<PublishedPage, ConfluenceError> {
        let result = match self.client.find_page(&self.space_key, &page.title)? {
            Some(existing) => self.client.update_page(
                &existing.id,
                &page.title,
                &page.content,
                existing.version.number,
                Some(&self.version_message),
            )?,
            None => self.client.create_page(
                &self.space_key,
                &page.title,
                &page.content,
                self.parent_id(page),
            )?,
        };

        self.published.insert(page.slug.clone(), result.id.clone());
        Ok(PublishedPage {
            url: Some(self.client.page_url(&result)),
            id: result.id,
        })
    }
}

/// Sink that records pages without any network access.
#[derive(Debug, Default)]
pub struct DryRunSink {
    pages: Vec<PublishPage>,
}

impl DryRunSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages received so far, in publish order.
    #[must_use]
    pub fn pages(&self) -> &[PublishPage] {
        &self.pages
    }
}

impl PageSink for DryRunSink {
    fn publish(&mut self, page: &PublishPage) -> Result<PublishedPage, ConfluenceError> {
        tracing::info!(
            slug = %page.slug,
            title = %page.title,
            bytes = page.content.len(),
            "Dry run: would publish page"
        );
        self.pages.push(page.clone());
        Ok(PublishedPage {
            id: format!("dry-run-{}", self.pages.len()),
            url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(slug: &str, parent: Option<&str>) -> PublishPage {
        PublishPage {
            slug: slug.to_owned(),
            title: slug.to_uppercase(),
            content: "<p>x</p>".to_owned(),
            metadata: BTreeMap::new(),
            parent_slug: parent.map(str::to_owned),
        }
    }

    fn config(parent_page_id: Option<&str>) -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://wiki.example.com".to_owned(),
            token: "t".to_owned(),
            space_key: "DOCS".to_owned(),
            parent_page_id: parent_page_id.map(str::to_owned),
            version_message: "sync".to_owned(),
        }
    }

    #[test]
    fn test_dry_run_records_pages() {
        let mut sink = DryRunSink::new();

        let first = sink.publish(&page("a", None)).unwrap();
        let second = sink.publish(&page("b", Some("a"))).unwrap();

        assert_eq!(first.id, "dry-run-1");
        assert_eq!(second.id, "dry-run-2");
        assert!(second.url.is_none());
        assert_eq!(sink.pages().len(), 2);
        assert_eq!(sink.pages()[1].parent_slug.as_deref(), Some("a"));
    }

    #[test]
    fn test_parent_id_prefers_published_parent() {
        let client = ConfluenceClient::new("https://wiki.example.com", "t");
        let mut sink = ConfluenceSink::new(&client, &config(Some("100")));
        sink.published.insert("guide".to_owned(), "200".to_owned());

        assert_eq!(sink.parent_id(&page("intro", Some("guide"))), Some("200"));
        assert_eq!(sink.parent_id(&page("other", Some("unpublished"))), Some("100"));
        assert_eq!(sink.parent_id(&page("index", None)), Some("100"));
    }

    #[test]
    fn test_parent_id_without_root_parent() {
        let client = ConfluenceClient::new("https://wiki.example.com", "t");
        let sink = ConfluenceSink::new(&client, &config(None));

        assert_eq!(sink.parent_id(&page("index", None)), None);
    }
}
