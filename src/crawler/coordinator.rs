//! Crawler coordinator - per-store run orchestration
//!
//! A run for one store goes through these steps:
//! - Reset the schema (full runs only) and open a run record
//! - Walk the department tree, collecting products and categories by depth
//! - Reconcile the discovered categories with the ones already stored,
//!   skipping categories whose parent department was pruned
//! - Write new categories (shallowest first) and then every product
//! - Close the run record and log a one-line summary

use crate::config::{Config, StoreEntry};
use crate::crawler::client::CatalogClient;
use crate::crawler::dedup;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::walker::TreeWalker;
use crate::model::{Category, DepthCategoryMap, Product, RunMode};
use crate::output::format_run_summary;
use crate::storage::CatalogStore;
use crate::CatalogError;
use std::collections::HashSet;

/// Outcome of one store's run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: i64,
    pub store_slug: String,
    pub mode: RunMode,
    /// Products extracted and written during the run
    pub products: Vec<Product>,
    /// Distinct categories in the reconciled set
    pub unique_categories: usize,
    /// Categories written during this run
    pub categories_written: usize,
    /// Ids that appeared with conflicting fields
    pub conflicting_ids: Vec<i64>,
}

impl RunReport {
    pub fn item_count(&self) -> usize {
        self.products.len()
    }
}

/// What a run produced before the run record is closed
struct Harvest {
    products: Vec<Product>,
    unique_categories: usize,
    categories_written: usize,
    conflicting_ids: Vec<i64>,
}

/// Main crawler coordinator structure
pub struct Coordinator<F, S> {
    config: Config,
    config_hash: String,
    fetcher: F,
    store: S,
}

impl<F: PageFetcher, S: CatalogStore> Coordinator<F, S> {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash of the configuration file, stored with every run
    /// * `fetcher` - Source of catalog pages
    /// * `store` - Destination for categories and products
    pub fn new(config: Config, config_hash: impl Into<String>, fetcher: F, store: S) -> Self {
        Self {
            config,
            config_hash: config_hash.into(),
            fetcher,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs every configured store in order
    ///
    /// The first store runs in `first_mode`; later stores always run
    /// incrementally so they extend the data written before them.
    pub async fn run_all(&mut self, first_mode: RunMode) -> Result<Vec<RunReport>, CatalogError> {
        let stores = self.config.stores.clone();
        let mut reports = Vec::with_capacity(stores.len());

        for (index, store) in stores.iter().enumerate() {
            let mode = if index == 0 {
                first_mode
            } else {
                RunMode::Incremental
            };
            reports.push(self.run_store(store, mode).await?);
        }

        Ok(reports)
    }

    /// Runs the configured store named `slug`
    pub async fn run_selected(&mut self, slug: &str, mode: RunMode) -> Result<RunReport, CatalogError> {
        let store = self
            .config
            .find_store(slug)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownStore(slug.to_string()))?;
        self.run_store(&store, mode).await
    }

    /// Runs one store
    ///
    /// A storage failure aborts the run; the run record is marked failed
    /// when possible. Rows written before the failure stay in place.
    pub async fn run_store(&mut self, store: &StoreEntry, mode: RunMode) -> Result<RunReport, CatalogError> {
        if mode.resets_schema() {
            self.store.reset_schema()?;
        }

        let run_id = self
            .store
            .create_run(&store.slug, mode, &self.config_hash)?;
        tracing::info!(
            "Starting {} run {} for store {} (id {})",
            mode,
            run_id,
            store.slug,
            store.id
        );

        match self.harvest(store, mode).await {
            Ok(harvest) => {
                self.store.complete_run(
                    run_id,
                    harvest.products.len() as u64,
                    harvest.unique_categories as u64,
                )?;

                let report = RunReport {
                    run_id,
                    store_slug: store.slug.clone(),
                    mode,
                    products: harvest.products,
                    unique_categories: harvest.unique_categories,
                    categories_written: harvest.categories_written,
                    conflicting_ids: harvest.conflicting_ids,
                };
                tracing::info!("{}", format_run_summary(&report));
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Run {} for store {} failed: {}", run_id, store.slug, e);
                if let Err(mark_err) = self.store.fail_run(run_id, &e.to_string()) {
                    tracing::warn!("Could not mark run {} as failed: {}", run_id, mark_err);
                }
                Err(e)
            }
        }
    }

    async fn harvest(&mut self, store: &StoreEntry, mode: RunMode) -> Result<Harvest, CatalogError> {
        let max_depth = self.config.crawler.max_depth;
        let client = CatalogClient::for_store(
            &self.fetcher,
            &self.config.api,
            &self.config.crawler,
            store,
        );
        let walker =
            TreeWalker::new(&client, max_depth).with_debug_mode(self.config.crawler.debug_mode);

        let existing = self.store.list_categories()?;
        let mut discovered = DepthCategoryMap::for_mode(mode, max_depth);
        if !existing.iter().any(Category::is_root) && discovered.at(0).is_empty() {
            tracing::info!("No root category stored yet, seeding it for {}", store.slug);
            discovered.record(0, Category::root());
        }

        let products = walker.walk(&mut discovered).await;
        tracing::info!(
            "Walk of {} finished: {} products, {} categories discovered",
            store.slug,
            products.len(),
            discovered.total()
        );

        let merged = dedup::merge(&existing, &discovered);

        let conflicting_ids = dedup::conflicting_ids(&merged);
        for id in &conflicting_ids {
            tracing::warn!(
                "Category {} was seen with conflicting fields; the store will reject the duplicate",
                id
            );
        }

        let (pending, orphans) =
            dedup::split_anchored(&existing, dedup::pending_writes(&existing, &merged));
        for orphan in &orphans {
            tracing::warn!(
                "Skipping category {} ('{}'): parent {:?} was pruned",
                orphan.id,
                orphan.name,
                orphan.parent_id
            );
        }

        for category in &pending {
            self.store.insert(category.into())?;
        }
        tracing::debug!("Wrote {} new categories", pending.len());

        let written: HashSet<i64> = existing
            .iter()
            .chain(&pending)
            .map(|category| category.id)
            .collect();
        let (products, stray): (Vec<Product>, Vec<Product>) = products
            .into_iter()
            .partition(|product| written.contains(&product.category_id));
        if !stray.is_empty() {
            tracing::warn!(
                "Skipping {} products whose category was not written",
                stray.len()
            );
        }

        for product in &products {
            self.store.insert(product.into())?;
        }

        Ok(Harvest {
            unique_categories: dedup::distinct_count(&merged) - orphans.len(),
            categories_written: pending.len(),
            conflicting_ids,
            products,
        })
    }
}
