//! Storage module for persisting catalog data
//!
//! This module handles all database operations for the walker, including:
//! - SQLite database initialization and schema reset
//! - Category and product persistence
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCatalogStore;
pub use traits::{CatalogStore, StorageError, StorageResult};

use crate::model::{Category, Product, RunMode};
use crate::CatalogError;

use std::path::Path;

/// Initializes or opens a catalog database
pub fn open_storage(path: &Path) -> Result<SqliteCatalogStore, CatalogError> {
    SqliteCatalogStore::new(path)
}

/// Something the store can persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity<'a> {
    Category(&'a Category),
    Product(&'a Product),
}

impl<'a> From<&'a Category> for Entity<'a> {
    fn from(category: &'a Category) -> Self {
        Entity::Category(category)
    }
}

impl<'a> From<&'a Product> for Entity<'a> {
    fn from(product: &'a Product) -> Self {
        Entity::Product(product)
    }
}

/// Represents a crawl run for one store
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub store_slug: String,
    pub mode: RunMode,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub item_count: Option<u64>,
    pub category_count: Option<u64>,
    pub error_message: Option<String>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
