//! Category definitions for the department tree

use std::fmt;

/// Id of the synthetic root category
pub const ROOT_CATEGORY_ID: i64 = 0;

/// Display name of the synthetic root category ("home category")
pub const ROOT_CATEGORY_NAME: &str = "Главная категория";

/// A node in the retailer's department hierarchy
///
/// Equality and hashing cover every field, so two records with the same
/// `id` but a different name or parent are distinct values. Deduplication
/// relies on this to keep conflicting upstream records visible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    /// True for leaf departments that list products directly
    pub is_final: bool,
    /// `None` only for the synthetic root
    pub parent_id: Option<i64>,
}

impl Category {
    /// The synthetic root every top-level department hangs from
    pub fn root() -> Self {
        Self {
            id: ROOT_CATEGORY_ID,
            name: ROOT_CATEGORY_NAME.to_string(),
            image_url: None,
            is_final: false,
            parent_id: None,
        }
    }

    /// A department without sub-departments
    pub fn leaf(id: i64, name: impl Into<String>, parent_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            image_url: None,
            is_final: true,
            parent_id: Some(parent_id),
        }
    }

    /// A department whose subtree produced at least one product
    pub fn internal(id: i64, name: impl Into<String>, parent_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            image_url: None,
            is_final: false,
            parent_id: Some(parent_id),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn kind(&self) -> NodeKind {
        if self.is_final {
            NodeKind::Leaf
        } else {
            NodeKind::Internal
        }
    }
}

/// Classification of a department node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// No sub-departments; the listing carries products
    Leaf,

    /// Has sub-departments that must be explored
    Internal,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
