//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CatalogStore trait.

use crate::model::{Category, Product, RunMode};
use crate::storage::schema::{self, initialize_schema};
use crate::storage::traits::{CatalogStore, StorageError, StorageResult};
use crate::storage::{Entity, RunRecord, RunStatus};
use crate::CatalogError;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, store_slug, mode, started_at, finished_at, config_hash, status,
     item_count, category_count, error_message";

/// SQLite storage backend
pub struct SqliteCatalogStore {
    conn: Connection,
}

impl SqliteCatalogStore {
    /// Opens (or creates) the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn insert_category(&mut self, category: &Category) -> StorageResult<()> {
        self.conn
            .execute(
                "INSERT INTO categories (id, name, image_url, is_final, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    category.id,
                    category.name,
                    category.image_url,
                    category.is_final,
                    category.parent_id
                ],
            )
            .map_err(|e| {
                classify_write_error(e, || format!("category {} ('{}')", category.id, category.name))
            })?;
        Ok(())
    }

    fn insert_product(&mut self, product: &Product) -> StorageResult<()> {
        self.conn
            .execute(
                "INSERT INTO products (name, image_url, category_id, link) VALUES (?1, ?2, ?3, ?4)",
                params![
                    product.name,
                    product.image_url,
                    product.category_id,
                    product.link
                ],
            )
            .map_err(|e| {
                classify_write_error(e, || {
                    format!(
                        "product {:?} in category {}",
                        product.name, product.category_id
                    )
                })
            })?;
        Ok(())
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Maps constraint failures to `ConstraintViolation`, everything else to `Sqlite`
fn classify_write_error(err: rusqlite::Error, what: impl FnOnce() -> String) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(format!(
                "{}: {}",
                what(),
                message.as_deref().unwrap_or("constraint failed")
            ))
        }
        _ => StorageError::Sqlite(err),
    }
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        store_slug: row.get(1)?,
        mode: RunMode::from_db_string(&row.get::<_, String>(2)?).unwrap_or(RunMode::Incremental),
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        config_hash: row.get(5)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(6)?)
            .unwrap_or(RunStatus::Running),
        item_count: row.get::<_, Option<i64>>(7)?.map(|n| n as u64),
        category_count: row.get::<_, Option<i64>>(8)?.map(|n| n as u64),
        error_message: row.get(9)?,
    })
}

impl CatalogStore for SqliteCatalogStore {
    // ===== Schema =====

    fn reset_schema(&mut self) -> StorageResult<()> {
        schema::reset_schema(&self.conn)?;
        tracing::info!("Catalog schema dropped and recreated");
        Ok(())
    }

    // ===== Entities =====

    fn insert(&mut self, entity: Entity<'_>) -> StorageResult<()> {
        match entity {
            Entity::Category(category) => self.insert_category(category),
            Entity::Product(product) => self.insert_product(product),
        }
    }

    fn list_categories(&self) -> StorageResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, image_url, is_final, parent_id FROM categories ORDER BY rowid",
        )?;

        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    image_url: row.get(2)?,
                    is_final: row.get(3)?,
                    parent_id: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    fn list_products(&self) -> StorageResult<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, image_url, category_id, link FROM products ORDER BY id")?;

        let products = stmt
            .query_map([], |row| {
                Ok(Product {
                    name: row.get(0)?,
                    image_url: row.get(1)?,
                    category_id: row.get(2)?,
                    link: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    // ===== Run Management =====

    fn create_run(
        &mut self,
        store_slug: &str,
        mode: RunMode,
        config_hash: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (store_slug, mode, started_at, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                store_slug,
                mode.to_db_string(),
                now,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        item_count: u64,
        category_count: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, item_count = ?3, category_count = ?4
             WHERE id = ?5",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                item_count as i64,
                category_count as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, message, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                row_to_run,
            )
            .optional()?;

        Ok(run)
    }

    fn list_runs(&self) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs ORDER BY id", RUN_COLUMNS))?;
        let runs = stmt
            .query_map([], row_to_run)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    // ===== Statistics =====

    fn count_categories(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM categories")
    }

    fn count_leaf_categories(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM categories WHERE is_final = 1")
    }

    fn count_products(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM products")
    }
}
