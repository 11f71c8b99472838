//! Shared helpers for unit tests

use crate::crawler::PageFetcher;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// A `PageFetcher` that answers from fixed documents and records every URL
///
/// Unknown URLs answer `{}`, the same as a failed fetch.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, Value>,
    probes: HashMap<String, Value>,
    requests: Mutex<Vec<String>>,
    ephemeral_requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for `fetch(url)`
    pub fn with_page(mut self, url: &str, document: Value) -> Self {
        self.pages.insert(url.to_string(), document);
        self
    }

    /// Answer for `fetch_ephemeral(url)`
    pub fn with_probe(mut self, url: &str, document: Value) -> Self {
        self.probes.insert(url.to_string(), document);
        self
    }

    /// Takes over every scripted answer of `other`
    pub fn absorb(&mut self, other: ScriptedFetcher) {
        self.pages.extend(other.pages);
        self.probes.extend(other.probes);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn ephemeral_requests(&self) -> Vec<String> {
        self.ephemeral_requests.lock().unwrap().clone()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len() + self.ephemeral_requests.lock().unwrap().len()
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Value {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    async fn fetch_ephemeral(&self, url: &str) -> Value {
        self.ephemeral_requests.lock().unwrap().push(url.to_string());
        self.probes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}

/// Builds a scripted catalog rooted at `base`
///
/// Departments are declared with their children; leaves list products.
/// Every listing gets a terminating empty second page, and every leaf probe
/// answers with the "no children" message.
pub struct CatalogScript {
    base: String,
    fetcher: ScriptedFetcher,
}

impl CatalogScript {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            fetcher: ScriptedFetcher::new(),
        }
    }

    fn listing(&self, slug: &str, page: u32) -> String {
        format!(
            "{}{}?offers_limit=100&per_page=100&page={}",
            self.base, slug, page
        )
    }

    /// Declares the listing of `slug` (id `id`, `None` for the store root)
    pub fn listing_of(mut self, slug: &str, id: Option<i64>, children: Value) -> Self {
        let mut first = serde_json::json!({ "departments": children });
        if let Some(id) = id {
            first["department"] = serde_json::json!({ "id": id });
        }
        let first_url = self.listing(slug, 1);
        let second_url = self.listing(slug, 2);
        self.fetcher = self
            .fetcher
            .with_page(&first_url, first)
            .with_page(&second_url, serde_json::json!({ "departments": [] }));
        self
    }

    /// Declares `slug` as a leaf for the children probe
    pub fn leaf(mut self, slug: &str) -> Self {
        let url = format!("{}{}", self.base, slug);
        self.fetcher = self.fetcher.with_probe(
            &url,
            serde_json::json!({ "message": "category without children" }),
        );
        self
    }

    pub fn build(self) -> ScriptedFetcher {
        self.fetcher
    }
}
