//! Storage traits and error types
//!
//! This module defines the trait interface for catalog storage backends and
//! associated error types.

use crate::model::{Category, Product, RunMode};
use crate::storage::{Entity, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog storage backends
///
/// Every write is its own unit of work and is durable once the call
/// returns; there is no transaction spanning a run.
pub trait CatalogStore {
    // ===== Schema =====

    /// Drops and recreates all tables
    fn reset_schema(&mut self) -> StorageResult<()>;

    // ===== Entities =====

    /// Persists one category or product
    fn insert(&mut self, entity: Entity<'_>) -> StorageResult<()>;

    /// Lists every persisted category
    fn list_categories(&self) -> StorageResult<Vec<Category>>;

    /// Lists every persisted product
    fn list_products(&self) -> StorageResult<Vec<Product>>;

    // ===== Run Management =====

    /// Creates a run record in the `running` state
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(
        &mut self,
        store_slug: &str,
        mode: RunMode,
        config_hash: &str,
    ) -> StorageResult<i64>;

    /// Marks a run as completed and records what it wrote
    fn complete_run(
        &mut self,
        run_id: i64,
        item_count: u64,
        category_count: u64,
    ) -> StorageResult<()>;

    /// Marks a run as failed with the error that stopped it
    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Lists all runs, oldest first
    fn list_runs(&self) -> StorageResult<Vec<RunRecord>>;

    // ===== Statistics =====

    /// Counts persisted categories, including the root
    fn count_categories(&self) -> StorageResult<u64>;

    /// Counts persisted final (leaf) categories
    fn count_leaf_categories(&self) -> StorageResult<u64>;

    /// Counts persisted products
    fn count_products(&self) -> StorageResult<u64>;
}
