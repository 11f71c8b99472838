//! Depth-indexed record of the categories discovered during a run

use crate::model::{Category, RunMode};
use std::collections::BTreeMap;

/// Categories discovered during one run, grouped by traversal depth
///
/// Depths `0..=max_depth` always exist (possibly empty). Depth 0 holds the
/// synthetic root on a full run; the walker records top-level departments
/// at depth 1 and their children at depth 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthCategoryMap {
    levels: BTreeMap<u32, Vec<Category>>,
    max_depth: u32,
}

impl DepthCategoryMap {
    /// Creates a map with every depth up to `max_depth` empty
    pub fn empty(max_depth: u32) -> Self {
        let levels = (0..=max_depth).map(|depth| (depth, Vec::new())).collect();
        Self { levels, max_depth }
    }

    /// Creates the starting map for a run
    ///
    /// A full run seeds depth 0 with the synthetic root; an incremental run
    /// leaves it empty because the root is already stored.
    pub fn for_mode(mode: RunMode, max_depth: u32) -> Self {
        let mut map = Self::empty(max_depth);
        if mode.resets_schema() {
            map.record(0, Category::root());
        }
        map
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Appends a category at the given depth
    ///
    /// Returns false (and records nothing) when `depth` exceeds the bound.
    pub fn record(&mut self, depth: u32, category: Category) -> bool {
        match self.levels.get_mut(&depth) {
            Some(level) => {
                level.push(category);
                true
            }
            None => {
                tracing::warn!(
                    "Refusing to record category {} at depth {} (max {})",
                    category.id,
                    depth,
                    self.max_depth
                );
                false
            }
        }
    }

    /// Replaces the contents of one depth
    pub(crate) fn set_level(&mut self, depth: u32, categories: Vec<Category>) {
        if depth <= self.max_depth {
            self.levels.insert(depth, categories);
        }
    }

    /// Categories recorded at `depth`, in discovery order
    pub fn at(&self, depth: u32) -> &[Category] {
        self.levels.get(&depth).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All depths in ascending order
    pub fn depths(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }

    /// Iterates `(depth, categories)` in ascending depth order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Category])> {
        self.levels
            .iter()
            .map(|(depth, level)| (*depth, level.as_slice()))
    }

    /// Iterates every category, shallowest depth first
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.levels.values().flatten()
    }

    /// Sum of entries across all depths
    pub fn total(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
