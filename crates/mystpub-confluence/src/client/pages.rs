//! Page operations for Confluence API.

use serde_json::{Value, json};
use tracing::info;

use super::{ConfluenceClient, read_json};
use crate::error::ConfluenceError;
use crate::types::{Page, SearchResult};

impl ConfluenceClient {
    /// Find a page by exact title within a space.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the request fails.
    pub fn find_page(&self, space_key: &str, title: &str) -> Result<Option<Page>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        info!(space = space_key, title, "Looking up page");

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .query("spaceKey", space_key)
            .query("title", title)
            .query("type", "page")
            .query("expand", "version")
            .call()?;

        let result: SearchResult = read_json(response)?;
        Ok(result.results.into_iter().next())
    }

    /// Create a page, optionally under `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the request fails.
    pub fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());
        let payload = create_payload(space_key, title, body, parent_id);

        info!(space = space_key, title, parent = parent_id, "Creating page");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send_json(&payload)?;

        let page: Page = read_json(response)?;
        info!(id = %page.id, title, "Created page");
        Ok(page)
    }

    /// Update existing page (auto-increments version).
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the request fails.
    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);
        let payload = update_payload(title, body, version, message);

        info!(
            id = page_id,
            from = version,
            to = version + 1,
            "Updating page"
        );

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send_json(&payload)?;

        let page: Page = read_json(response)?;
        info!(id = page_id, version = page.version.number, "Updated page");
        Ok(page)
    }

    /// Web URL for a page returned by the API.
    #[must_use]
    pub fn page_url(&self, page: &Page) -> String {
        match page.links.as_ref().and_then(|links| links.webui.as_deref()) {
            Some(webui) => format!("{}{}", self.base_url, webui),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.base_url, page.id
            ),
        }
    }
}

fn storage(body: &str) -> Value {
    json!({
        "storage": {
            "value": body,
            "representation": "storage"
        }
    })
}

fn create_payload(space_key: &str, title: &str, body: &str, parent_id: Option<&str>) -> Value {
    let mut payload = json!({
        "type": "page",
        "title": title,
        "space": {"key": space_key},
        "body": storage(body)
    });

    if let Some(parent) = parent_id {
        payload["ancestors"] = json!([{"id": parent}]);
    }
    payload
}

fn update_payload(title: &str, body: &str, version: u32, message: Option<&str>) -> Value {
    let mut payload = json!({
        "type": "page",
        "title": title,
        "body": storage(body),
        "version": {"number": version + 1}
    });

    if let Some(msg) = message {
        payload["version"]["message"] = json!(msg);
    }
    payload
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{Links, Version};

    fn page(links: Option<Links>) -> Page {
        Page {
            id: "42".to_owned(),
            content_type: "page".to_owned(),
            title: "Intro".to_owned(),
            version: Version {
                number: 1,
                message: None,
            },
            body: None,
            links,
        }
    }

    #[test]
    fn test_create_payload_with_parent() {
        let payload = create_payload("DOCS", "Intro", "<p>x</p>", Some("7"));

        assert_eq!(
            payload,
            json!({
                "type": "page",
                "title": "Intro",
                "space": {"key": "DOCS"},
                "body": {"storage": {"value": "<p>x</p>", "representation": "storage"}},
                "ancestors": [{"id": "7"}]
            })
        );
    }

    #[test]
    fn test_create_payload_without_parent() {
        let payload = create_payload("DOCS", "Intro", "", None);

        assert!(payload.get("ancestors").is_none());
    }

    #[test]
    fn test_update_payload_increments_version() {
        let payload = update_payload("Intro", "<p>x</p>", 4, Some("sync"));

        assert_eq!(payload["version"], json!({"number": 5, "message": "sync"}));
    }

    #[test]
    fn test_update_payload_without_message() {
        let payload = update_payload("Intro", "", 1, None);

        assert_eq!(payload["version"], json!({"number": 2}));
    }

    #[test]
    fn test_page_url_uses_webui_link() {
        let client = ConfluenceClient::new("https://wiki.example.com", "t");
        let page = page(Some(Links {
            webui: Some("/display/DOCS/Intro".to_owned()),
            self_link: None,
        }));

        assert_eq!(client.page_url(&page), "https://wiki.example.com/display/DOCS/Intro");
    }

    #[test]
    fn test_page_url_fallback() {
        let client = ConfluenceClient::new("https://wiki.example.com", "t");

        assert_eq!(
            client.page_url(&page(None)),
            "https://wiki.example.com/pages/viewpage.action?pageId=42"
        );
    }
}
