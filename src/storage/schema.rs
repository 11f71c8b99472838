//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Catalog-Walker database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs, one per store
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    store_slug TEXT NOT NULL,
    mode TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    item_count INTEGER,
    category_count INTEGER,
    error_message TEXT
);

-- Department tree; parent_id is NULL only for the synthetic root
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    image_url TEXT,
    is_final INTEGER NOT NULL,
    parent_id INTEGER REFERENCES categories(id)
);

CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);

-- Products listed under final categories
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    image_url TEXT,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    link TEXT
);

CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
"#;

/// Drops every table, children before parents
pub const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS categories;
DROP TABLE IF EXISTS runs;
"#;

/// Initializes the database schema
///
/// Safe to call on an already initialized database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Drops and recreates the schema
pub fn reset_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(DROP_SQL)?;
    initialize_schema(conn)
}
