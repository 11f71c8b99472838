//! Recursive department-tree walker
//!
//! The walker explores a department page by page. Every child is first
//! classified with a separate probe request, because the listing alone does
//! not say whether a child is a leaf:
//!
//! | Child | Action |
//! |-------|--------|
//! | Leaf | Record as final category, collect its products |
//! | Internal | Explore one level deeper; record only if the subtree yielded products |
//!
//! Exploration below `max_depth` is pruned without any request. Discovered
//! categories go into a `DepthCategoryMap` owned by the caller and passed
//! down by `&mut`.

use crate::crawler::client::CatalogClient;
use crate::crawler::fetcher::PageFetcher;
use crate::model::{Category, DepthCategoryMap, NodeKind, Product};
use std::future::Future;
use std::pin::Pin;

/// Default deepest level explored below the root
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Boxed future returned by the recursive exploration
pub type ExploreFuture<'a> = Pin<Box<dyn Future<Output = Vec<Product>> + 'a>>;

/// Depth-first walker over one store's department tree
pub struct TreeWalker<'c, F> {
    client: &'c CatalogClient<F>,
    max_depth: u32,
    debug_mode: bool,
}

impl<'c, F: PageFetcher> TreeWalker<'c, F> {
    pub fn new(client: &'c CatalogClient<F>, max_depth: u32) -> Self {
        Self {
            client,
            max_depth,
            debug_mode: false,
        }
    }

    /// In debug mode only the first child of every page is followed
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Walks the whole store, starting at its top level (depth 1)
    pub async fn walk(&self, categories: &mut DepthCategoryMap) -> Vec<Product> {
        self.explore("", 1, categories).await
    }

    /// Explores department `slug` found at `depth`
    ///
    /// Children of `slug` are recorded at index `depth` of `categories`,
    /// linked to the department id reported by the listing. Returns the
    /// products of every leaf reached below `slug`.
    pub fn explore<'a>(
        &'a self,
        slug: &'a str,
        depth: u32,
        categories: &'a mut DepthCategoryMap,
    ) -> ExploreFuture<'a> {
        Box::pin(async move {
            let mut collected = Vec::new();

            if depth > self.max_depth {
                tracing::trace!("Depth {} exceeds {}, pruning {}", depth, self.max_depth, slug);
                return collected;
            }

            let mut page_number = 1;
            loop {
                let page = self.client.list_page(slug, page_number).await;
                let parent_id = page.current_category_id;

                let children = match page.children {
                    Some(children) if !children.is_empty() => children,
                    Some(_) => {
                        tracing::info!(
                            "Empty departments in {} (page {})",
                            display_slug(slug),
                            page_number
                        );
                        break;
                    }
                    None => {
                        tracing::warn!(
                            "No departments field in {} (page {}), stopping here",
                            display_slug(slug),
                            page_number
                        );
                        break;
                    }
                };

                for child in &children {
                    match self.client.classify(&child.slug).await {
                        NodeKind::Internal => {
                            let child_items = self
                                .explore(&child.slug, depth + 1, &mut *categories)
                                .await;

                            if child_items.is_empty() {
                                tracing::debug!(
                                    "Dropping {} ({}): no products below it",
                                    child.slug,
                                    child.id
                                );
                            } else {
                                categories.record(
                                    depth,
                                    Category::internal(child.id, child.name.as_str(), parent_id),
                                );
                                collected.extend(child_items);
                            }
                        }
                        NodeKind::Leaf => {
                            categories.record(
                                depth,
                                Category::leaf(child.id, child.name.as_str(), parent_id),
                            );
                            let products = self.client.extract_leaf_products(child);
                            tracing::debug!(
                                "Leaf {} ({}) lists {} products",
                                child.slug,
                                child.id,
                                products.len()
                            );
                            collected.extend(products);
                        }
                    }

                    if self.debug_mode {
                        break;
                    }
                }

                page_number += 1;
            }

            collected
        })
    }
}

fn display_slug(slug: &str) -> &str {
    if slug.is_empty() {
        "base page"
    } else {
        slug
    }
}
