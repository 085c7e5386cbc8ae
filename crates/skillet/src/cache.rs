//! Client cache and filter engine.
//!
//! [`RecipeCache`] owns the full local mirror of the collection. The
//! displayed list is never stored: it is recomputed on demand from the
//! mirror plus the current [`FilterState`], so a stale derived view
//! cannot survive a mutation.

use std::collections::BTreeSet;

use ladleproto::{Platform, Recipe, RecipeId};
use rand::seq::SliceRandom;

/// Display ordering of the filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Whatever order the server returned.
    Natural,
    /// Descending by id (ids are time-derived).
    #[default]
    NewestFirst,
    /// Ascending by id.
    OldestFirst,
}

/// Active filters. All present predicates must match (conjunctive).
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub platform: Option<Platform>,
    pub category: Option<String>,
    /// Case-insensitive title substring. Empty means no search filter.
    pub search: Option<String>,
    pub sort: SortMode,
}

impl FilterState {
    fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(platform) = self.platform {
            if recipe.platform() != Some(platform) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if recipe.category() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            if !term.is_empty()
                && !recipe.title.to_lowercase().contains(&term.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// The client's full mirror of the collection.
///
/// Replaced wholesale on load, patched by key on mutations. Owned by a
/// single controller ([`crate::Session`]); nothing here is shared or
/// free-floating.
#[derive(Debug, Clone, Default)]
pub struct RecipeCache {
    all: Vec<Recipe>,
}

impl RecipeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirror wholesale (after a full reload).
    pub fn set_collection(&mut self, records: Vec<Recipe>) {
        self.all = records;
    }

    /// Clone the current state for later rollback.
    pub fn snapshot(&self) -> Vec<Recipe> {
        self.all.clone()
    }

    /// Restore a previously taken snapshot.
    pub fn restore(&mut self, snapshot: Vec<Recipe>) {
        self.all = snapshot;
    }

    pub fn all(&self) -> &[Recipe] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.all.iter().find(|r| r.id == id)
    }

    pub fn insert(&mut self, recipe: Recipe) {
        self.all.push(recipe);
    }

    /// Remove by id; absence is fine.
    pub fn remove(&mut self, id: RecipeId) {
        self.all.retain(|r| r.id != id);
    }

    /// Replace the record carrying `key` with `recipe`, matching on the
    /// stable key rather than position. If the keyed record is gone
    /// (an out-of-order response landed after a reload), the
    /// authoritative record is inserted instead of being dropped.
    pub fn reconcile(&mut self, key: RecipeId, recipe: Recipe) {
        match self.all.iter_mut().find(|r| r.id == key) {
            Some(slot) => *slot = recipe,
            None => self.all.push(recipe),
        }
    }

    /// Merge `patch`-style changes into the cached record, if present.
    pub fn patch(&mut self, id: RecipeId, patch: &ladleproto::RecipePatch) -> bool {
        match self.all.iter_mut().find(|r| r.id == id) {
            Some(recipe) => {
                patch.apply_to(recipe);
                true
            }
            None => false,
        }
    }

    /// Distinct platforms present in the mirror, sorted. Drives the
    /// platform filter options; recomputed from live data, never fixed.
    pub fn platform_options(&self) -> Vec<Platform> {
        let set: BTreeSet<Platform> = self.all.iter().filter_map(Recipe::platform).collect();
        set.into_iter().collect()
    }

    /// Build the displayed list: filter conjunctively, then sort.
    pub fn recompute(&self, filters: &FilterState) -> Vec<Recipe> {
        let mut displayed: Vec<Recipe> = self
            .all
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect();

        match filters.sort {
            SortMode::Natural => {}
            SortMode::NewestFirst => displayed.sort_by(|a, b| b.id.cmp(&a.id)),
            SortMode::OldestFirst => displayed.sort_by(|a, b| a.id.cmp(&b.id)),
        }

        displayed
    }
}

/// Pick one displayed recipe at random.
pub fn random_pick(displayed: &[Recipe]) -> Option<&Recipe> {
    displayed.choose(&mut rand::thread_rng())
}
