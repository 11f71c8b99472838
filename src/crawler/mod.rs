//! Crawler module for walking store catalogs
//!
//! This module contains the core crawling logic, including:
//! - Page fetching with a shared main context and ephemeral probe contexts
//! - Reading department listings and classifying children
//! - The recursive depth-bounded tree walk
//! - Reconciling discovered categories with stored ones
//! - Per-store run coordination

mod client;
mod coordinator;
pub mod dedup;
mod fetcher;
mod walker;

pub use client::{
    leaf_products, store_base_url, CatalogClient, ChildDescriptor, PageResult, NO_CHILDREN_MARKER,
};
pub use coordinator::{Coordinator, RunReport};
pub use fetcher::{
    build_http_client, decode_document, empty_document, HttpPageFetcher, PageFetcher,
};
pub use walker::{ExploreFuture, TreeWalker, DEFAULT_MAX_DEPTH};

use crate::config::Config;
use crate::model::RunMode;
use crate::storage::open_storage;
use crate::CatalogError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// Opens the database at `output.database-path`, builds the HTTP fetcher
/// and crawls either the store named `only_store` or every configured store
/// in order.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, recorded with each run
/// * `first_mode` - Mode of the first (or only) store's run
/// * `only_store` - Slug of a single store to crawl
///
/// # Returns
///
/// * `Ok(Vec<RunReport>)` - One report per store crawled
/// * `Err(CatalogError)` - A run failed; earlier runs stay persisted
pub async fn crawl(
    config: Config,
    config_hash: &str,
    first_mode: RunMode,
    only_store: Option<&str>,
) -> Result<Vec<RunReport>, CatalogError> {
    let store = open_storage(Path::new(&config.output.database_path))?;
    let fetcher = HttpPageFetcher::new(&config.browser)?;
    let mut coordinator = Coordinator::new(config, config_hash, fetcher, store);

    match only_store {
        Some(slug) => Ok(vec![coordinator.run_selected(slug, first_mode).await?]),
        None => coordinator.run_all(first_mode).await,
    }
}
