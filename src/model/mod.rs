//! Domain model for the catalog crawl
//!
//! # Components
//!
//! - `Category`: a department node, either internal or final (leaf)
//! - `Product`: an item listed directly under a final category
//! - `DepthCategoryMap`: categories discovered during one run, indexed by depth
//! - `RunMode`: whether a run starts from an empty store or extends an existing one

mod category;
mod depth_map;
mod product;

pub use category::{Category, NodeKind, ROOT_CATEGORY_ID, ROOT_CATEGORY_NAME};
pub use depth_map::DepthCategoryMap;
pub use product::Product;

use std::fmt;

/// How a run treats previously persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Drop and recreate the schema, then seed the synthetic root category
    Full,

    /// Keep existing rows and reconcile new categories against them
    Incremental,
}

impl RunMode {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Incremental => "incremental",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "incremental" => Some(Self::Incremental),
            _ => None,
        }
    }

    /// Returns true if the run starts by resetting the schema
    pub fn resets_schema(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
