//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Content type (always "page").
    #[serde(rename = "type")]
    pub content_type: String,
    /// Page title.
    pub title: String,
    /// Version information.
    pub version: Version,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

/// Page version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link, relative to the server base URL.
    #[serde(default)]
    pub webui: Option<String>,
    /// API self link.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

/// Content search response (`GET /rest/api/content`).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    /// Matching pages.
    #[serde(default)]
    pub results: Vec<Page>,
    /// Number of results in this response.
    #[serde(default)]
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search_result() {
        let json = r#"{
            "results": [{
                "id": "42",
                "type": "page",
                "title": "Intro",
                "version": {"number": 3},
                "_links": {"webui": "/display/DOCS/Intro"}
            }],
            "size": 1
        }"#;

        let result: SearchResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.size, 1);
        let page = &result.results[0];
        assert_eq!(page.id, "42");
        assert_eq!(page.version.number, 3);
        assert!(page.version.message.is_none());
        assert_eq!(
            page.links.as_ref().and_then(|l| l.webui.as_deref()),
            Some("/display/DOCS/Intro")
        );
    }

    #[test]
    fn test_deserialize_empty_search_result() {
        let result: SearchResult = serde_json::from_str(r#"{"results": [], "size": 0}"#).unwrap();

        assert!(result.results.is_empty());
    }
}
