//! Confluence API types.

mod page;

pub use page::{Body, Links, Page, SearchResult, Storage, Version};
