//! Reconciliation of freshly discovered categories with stored ones
//!
//! Categories compare by every field. Two records that share an `id` but
//! differ elsewhere both survive a merge; `conflicting_ids` reports them so
//! callers can see the upstream inconsistency instead of losing one side.

use crate::model::{Category, DepthCategoryMap};
use std::collections::{HashMap, HashSet};

/// Unions `existing` into every depth of `fresh`
///
/// Each depth of the result holds the stored categories followed by that
/// depth's fresh ones, with exact duplicates collapsed (first occurrence
/// wins). `fresh` is left untouched. Merging an already merged map with the
/// same `existing` set changes nothing.
pub fn merge(existing: &[Category], fresh: &DepthCategoryMap) -> DepthCategoryMap {
    let mut merged = DepthCategoryMap::empty(fresh.max_depth());

    for (depth, level) in fresh.iter() {
        let mut seen: HashSet<&Category> = HashSet::new();
        let union = existing
            .iter()
            .chain(level)
            .filter(|category| seen.insert(*category))
            .cloned()
            .collect();
        merged.set_level(depth, union);
    }

    merged
}

/// Ids that occur with more than one distinct set of fields, ascending
pub fn conflicting_ids(map: &DepthCategoryMap) -> Vec<i64> {
    let mut variants: HashMap<i64, HashSet<&Category>> = HashMap::new();
    for category in map.categories() {
        variants.entry(category.id).or_default().insert(category);
    }

    let mut ids: Vec<i64> = variants
        .into_iter()
        .filter(|(_, versions)| versions.len() > 1)
        .map(|(id, _)| id)
        .collect();
    ids.sort_unstable();
    ids
}

/// Categories of `merged` that still have to be written, shallowest first
///
/// Anything already in `existing` is skipped, and each value is returned
/// once even when it appears at several depths.
pub fn pending_writes(existing: &[Category], merged: &DepthCategoryMap) -> Vec<Category> {
    let mut seen: HashSet<&Category> = existing.iter().collect();
    merged
        .categories()
        .filter(|category| seen.insert(*category))
        .cloned()
        .collect()
}

/// Splits `pending` into categories whose parent is known and orphans
///
/// A parent is known when it is stored already or kept earlier in this
/// pass, so `pending` must come shallowest first. The root is always kept.
/// Orphans are leaves under a department that was pruned for lack of
/// products.
pub fn split_anchored(existing: &[Category], pending: Vec<Category>) -> (Vec<Category>, Vec<Category>) {
    let mut known: HashSet<i64> = existing.iter().map(|category| category.id).collect();
    let mut anchored = Vec::with_capacity(pending.len());
    let mut orphans = Vec::new();

    for category in pending {
        let has_parent = match category.parent_id {
            None => true,
            Some(parent) => known.contains(&parent),
        };
        if has_parent {
            known.insert(category.id);
            anchored.push(category);
        } else {
            orphans.push(category);
        }
    }

    (anchored, orphans)
}

/// Number of distinct categories across all depths
pub fn distinct_count(map: &DepthCategoryMap) -> usize {
    map.categories().collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunMode;

    fn fresh_map() -> DepthCategoryMap {
        let mut fresh = DepthCategoryMap::for_mode(RunMode::Incremental, 2);
        fresh.record(1, Category::internal(1, "Food", 0));
        fresh.record(1, Category::leaf(2, "Drinks", 0));
        fresh.record(2, Category::leaf(11, "Dairy", 1));
        fresh
    }

    fn stored() -> Vec<Category> {
        vec![Category::root(), Category::leaf(2, "Drinks", 0)]
    }

    #[test]
    fn test_merge_unions_existing_into_every_depth() {
        let merged = merge(&stored(), &fresh_map());

        assert_eq!(merged.at(0), stored().as_slice());
        assert_eq!(
            merged.at(1),
            &[
                Category::root(),
                Category::leaf(2, "Drinks", 0),
                Category::internal(1, "Food", 0)
            ]
        );
        assert_eq!(
            merged.at(2),
            &[
                Category::root(),
                Category::leaf(2, "Drinks", 0),
                Category::leaf(11, "Dairy", 1)
            ]
        );
    }

    #[test]
    fn test_merge_does_not_touch_input() {
        let fresh = fresh_map();
        let before = fresh.clone();
        let _ = merge(&stored(), &fresh);
        assert_eq!(fresh, before);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = stored();
        let once = merge(&existing, &fresh_map());
        let twice = merge(&existing, &once);
        assert_eq!(once, twice);

        // Same inputs, same answer
        assert_eq!(merge(&existing, &fresh_map()), once);
    }

    #[test]
    fn test_merge_with_nothing_stored_is_identity() {
        let fresh = fresh_map();
        assert_eq!(merge(&[], &fresh), fresh);
    }

    #[test]
    fn test_same_id_different_fields_survives_and_is_reported() {
        let existing = vec![Category::root(), Category::leaf(2, "Drinks", 0)];
        let mut fresh = DepthCategoryMap::empty(2);
        fresh.record(1, Category::leaf(2, "Beverages", 0));

        let merged = merge(&existing, &fresh);

        let twos: Vec<_> = merged.at(1).iter().filter(|c| c.id == 2).collect();
        assert_eq!(twos.len(), 2);
        assert_eq!(conflicting_ids(&merged), vec![2]);
        assert_eq!(conflicting_ids(&merge(&existing, &fresh_map())), Vec::<i64>::new());
    }

    #[test]
    fn test_pending_writes_skip_stored_rows() {
        let existing = stored();
        let merged = merge(&existing, &fresh_map());

        let pending = pending_writes(&existing, &merged);

        assert_eq!(
            pending,
            vec![
                Category::internal(1, "Food", 0),
                Category::leaf(11, "Dairy", 1)
            ]
        );
    }

    #[test]
    fn test_pending_writes_on_full_run_include_root_first() {
        let mut fresh = DepthCategoryMap::for_mode(RunMode::Full, 2);
        fresh.record(1, Category::leaf(2, "Drinks", 0));
        let merged = merge(&[], &fresh);

        let pending = pending_writes(&[], &merged);
        assert_eq!(pending[0], Category::root());
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn test_leaf_under_pruned_department_is_orphaned() {
        // Food(1) was pruned; its empty leaf Dairy(11) still sits at depth 2
        let mut fresh = DepthCategoryMap::for_mode(RunMode::Full, 2);
        fresh.record(1, Category::leaf(2, "Drinks", 0));
        fresh.record(2, Category::leaf(11, "Dairy", 1));
        let merged = merge(&[], &fresh);

        let (anchored, orphans) = split_anchored(&[], pending_writes(&[], &merged));

        assert_eq!(
            anchored,
            vec![Category::root(), Category::leaf(2, "Drinks", 0)]
        );
        assert_eq!(orphans, vec![Category::leaf(11, "Dairy", 1)]);
    }

    #[test]
    fn test_stored_parent_anchors_new_child() {
        let existing = vec![Category::root(), Category::internal(1, "Food", 0)];
        let pending = vec![
            Category::leaf(11, "Dairy", 1),
            Category::internal(3, "Home", 0),
            Category::leaf(31, "Kitchen", 3),
        ];

        let (anchored, orphans) = split_anchored(&existing, pending.clone());

        assert_eq!(anchored, pending);
        assert!(orphans.is_empty());
    }

    #[test]
    fn test_distinct_count_ignores_repeats_across_depths() {
        let merged = merge(&stored(), &fresh_map());
        assert_eq!(merged.total(), 8);
        assert_eq!(distinct_count(&merged), 4);
    }
}
