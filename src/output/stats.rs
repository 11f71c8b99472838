//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::storage::{CatalogStore, RunRecord, RunStatus};
use crate::CatalogError;

/// Catalog statistics summary
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    /// Total number of stored categories, root included
    pub total_categories: u64,

    /// Categories marked final
    pub leaf_categories: u64,

    /// Categories with children
    pub internal_categories: u64,

    /// Total number of stored products
    pub total_products: u64,

    /// Recorded runs, oldest first
    pub runs: Vec<RunRecord>,
}

impl CatalogStatistics {
    /// Average number of products per final category
    pub fn products_per_leaf(&self) -> f64 {
        if self.leaf_categories == 0 {
            0.0
        } else {
            self.total_products as f64 / self.leaf_categories as f64
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(CatalogError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn CatalogStore) -> Result<CatalogStatistics, CatalogError> {
    let total_categories = storage.count_categories()?;
    let leaf_categories = storage.count_leaf_categories()?;
    let total_products = storage.count_products()?;
    let runs = storage.list_runs()?;

    Ok(CatalogStatistics {
        total_categories,
        leaf_categories,
        internal_categories: total_categories.saturating_sub(leaf_categories),
        total_products,
        runs,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Categories: {}", stats.total_categories);
    println!("    Final: {}", stats.leaf_categories);
    println!("    With children: {}", stats.internal_categories);
    println!("  Products: {}", stats.total_products);
    println!("  Products per final category: {:.1}", stats.products_per_leaf());
    println!();

    if stats.runs.is_empty() {
        println!("No runs recorded");
        return;
    }

    println!("Runs ({}):", stats.runs.len());
    for run in &stats.runs {
        let outcome = match run.status {
            RunStatus::Completed => format!(
                "{} items, {} categories",
                run.item_count.unwrap_or(0),
                run.category_count.unwrap_or(0)
            ),
            RunStatus::Failed => run
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
            RunStatus::Running => "unfinished".to_string(),
        };
        println!(
            "  #{} {} ({}) {} at {}: {}",
            run.id,
            run.store_slug,
            run.mode,
            run.status.to_db_string(),
            run.started_at,
            outcome
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Product, RunMode};
    use crate::storage::SqliteCatalogStore;

    #[test]
    fn test_load_statistics_counts_by_kind() {
        let mut store = SqliteCatalogStore::new_in_memory().unwrap();
        let root = Category::root();
        let food = Category::internal(1, "Food", 0);
        let dairy = Category::leaf(11, "Dairy", 1);
        let drinks = Category::leaf(2, "Drinks", 0);
        for category in [&root, &food, &dairy, &drinks] {
            store.insert(category.into()).unwrap();
        }
        for name in ["Milk", "Kefir", "Water"] {
            let product = Product::new(Some(name.to_string()), None, 11, None);
            store.insert((&product).into()).unwrap();
        }
        let run_id = store.create_run("auchan", RunMode::Full, "hash").unwrap();
        store.complete_run(run_id, 3, 4).unwrap();

        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_categories, 4);
        assert_eq!(stats.leaf_categories, 2);
        assert_eq!(stats.internal_categories, 2);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.runs.len(), 1);
        assert!((stats.products_per_leaf() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_database_statistics() {
        let store = SqliteCatalogStore::new_in_memory().unwrap();
        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_categories, 0);
        assert_eq!(stats.products_per_leaf(), 0.0);
        assert!(stats.runs.is_empty());
    }
}
