//! Catalog API client
//!
//! Translates "list the children of department X, page N" into a fetch and
//! reads the answer: which department was listed, which children it has,
//! whether a child has children of its own, and what products a leaf lists.

use crate::config::{ApiConfig, CrawlerConfig, StoreEntry};
use crate::crawler::fetcher::PageFetcher;
use crate::model::{NodeKind, Product, ROOT_CATEGORY_ID};
use serde::Deserialize;
use serde_json::Value;

/// Substring of the API message returned for departments without children
pub const NO_CHILDREN_MARKER: &str = "category without children";

const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Builds the departments endpoint for a store, ending in `/`
///
/// Slugs are appended directly to this URL.
pub fn store_base_url(api_base: &str, store_id: u64) -> String {
    format!(
        "{}/api/v3/stores/{}/departments/",
        api_base.trim_end_matches('/'),
        store_id
    )
}

/// A child department as it appears in a listing page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChildDescriptor {
    pub id: i64,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    /// Raw product entries; only populated for leaf departments
    #[serde(default)]
    pub products: Option<Vec<Value>>,
}

/// One page of a department listing
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Id of the listed department, or the root id for the store's top level
    pub current_category_id: i64,

    /// Children on this page
    ///
    /// `Some(vec![])` marks the end of pagination. `None` means the
    /// `departments` field was missing altogether.
    pub children: Option<Vec<ChildDescriptor>>,
}

impl PageResult {
    /// Reads a listing page out of a decoded document
    ///
    /// Child entries lacking an `id` or `slug` are skipped.
    pub fn from_document(document: &Value) -> Self {
        let current_category_id = document
            .get("department")
            .and_then(|department| department.get("id"))
            .and_then(Value::as_i64)
            .unwrap_or(ROOT_CATEGORY_ID);

        let children = document
            .get("departments")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        match ChildDescriptor::deserialize(entry) {
                            Ok(child) => Some(child),
                            Err(e) => {
                                tracing::warn!("Skipping malformed department entry: {}", e);
                                None
                            }
                        }
                    })
                    .collect()
            });

        Self {
            current_category_id,
            children,
        }
    }
}

/// Reads the products listed under a leaf department
///
/// Missing fields become `None`; the image is the first of `image_urls`.
pub fn leaf_products(child: &ChildDescriptor) -> Vec<Product> {
    let Some(entries) = &child.products else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| {
            let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
            let image_url = entry
                .get("image_urls")
                .and_then(Value::as_array)
                .and_then(|urls| urls.first())
                .and_then(Value::as_str)
                .map(str::to_string);

            Product::new(text("name"), image_url, child.id, text("canonical_url"))
        })
        .collect()
}

/// Client for one store's department endpoint
pub struct CatalogClient<F> {
    fetcher: F,
    base_url: String,
    per_page: u32,
    offers_limit: u32,
}

impl<F: PageFetcher> CatalogClient<F> {
    /// Creates a client for `base_url` (see [`store_base_url`])
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            per_page: DEFAULT_PAGE_LIMIT,
            offers_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Creates a client for a configured store
    pub fn for_store(
        fetcher: F,
        api: &ApiConfig,
        crawler: &CrawlerConfig,
        store: &StoreEntry,
    ) -> Self {
        Self::new(fetcher, store_base_url(&api.base_url, store.id))
            .with_page_limits(crawler.per_page, crawler.offers_limit)
    }

    pub fn with_page_limits(mut self, per_page: u32, offers_limit: u32) -> Self {
        self.per_page = per_page;
        self.offers_limit = offers_limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// URL of one listing page of `slug` (empty slug = store top level)
    pub fn listing_url(&self, slug: &str, page: u32) -> String {
        format!(
            "{}{}?offers_limit={}&per_page={}&page={}",
            self.base_url, slug, self.offers_limit, self.per_page, page
        )
    }

    /// URL used to probe whether `slug` has children
    pub fn probe_url(&self, slug: &str) -> String {
        format!("{}{}", self.base_url, slug)
    }

    /// Fetches and reads one listing page
    pub async fn list_page(&self, slug: &str, page: u32) -> PageResult {
        let url = self.listing_url(slug, page);
        let document = self.fetcher.fetch(&url).await;
        PageResult::from_document(&document)
    }

    /// Probes `slug` in an isolated context
    ///
    /// Only an explicit "category without children" message means no;
    /// anything else, including an unreadable answer, means yes.
    pub async fn has_children(&self, slug: &str) -> bool {
        let document = self.fetcher.fetch_ephemeral(&self.probe_url(slug)).await;
        let childless = document
            .get("message")
            .and_then(Value::as_str)
            .is_some_and(|message| message.contains(NO_CHILDREN_MARKER));
        !childless
    }

    /// Classifies a child department before the walker branches on it
    pub async fn classify(&self, slug: &str) -> NodeKind {
        if self.has_children(slug).await {
            NodeKind::Internal
        } else {
            NodeKind::Leaf
        }
    }

    /// Products listed under a leaf child, attributed to that child
    pub fn extract_leaf_products(&self, child: &ChildDescriptor) -> Vec<Product> {
        leaf_products(child)
    }
}
