//! Pure collection operations.
//!
//! Each REST mutation reduces to one of these functions applied to a
//! private copy of the collection inside the coordinator. Keeping them
//! free of IO makes the semantics testable without a store.

use chrono::Utc;
use ladleproto::{Recipe, RecipeDraft, RecipeId, RecipePatch};
use thiserror::Error;

/// Domain failures a mutation can signal. The coordinator propagates
/// these without attempting the save.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("recipe {0} not found")]
    NotFound(RecipeId),
}

/// Millisecond-clock id, bumped past any value already taken.
///
/// Ids are monotonic-ish, not guaranteed strictly increasing under
/// concurrent creation; uniqueness within one collection is what the
/// bump loop guarantees.
fn fresh_id(taken: impl Fn(RecipeId) -> bool, candidate: Option<RecipeId>) -> RecipeId {
    let mut id = match candidate {
        Some(id) if !taken(id) => return id,
        _ => RecipeId(Utc::now().timestamp_millis()),
    };
    while taken(id) {
        id = RecipeId(id.0 + 1);
    }
    id
}

/// Append a new record. A client-suggested id is honored when free and
/// silently reassigned on collision; the returned record carries the
/// authoritative id either way.
pub fn create(recipes: &mut Vec<Recipe>, draft: RecipeDraft) -> Recipe {
    let suggested = draft.id.filter(|id| !id.is_temporary());
    let id = fresh_id(|id| recipes.iter().any(|r| r.id == id), suggested);
    let recipe = draft.into_recipe(id);
    recipes.push(recipe.clone());
    recipe
}

/// Shallow-merge `patch` over the record with `id`, preserving the id.
pub fn update(recipes: &mut [Recipe], id: RecipeId, patch: &RecipePatch) -> Result<Recipe, OpError> {
    let recipe = recipes
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(OpError::NotFound(id))?;
    patch.apply_to(recipe);
    Ok(recipe.clone())
}

/// Remove the record with `id`. Absence is not an error.
pub fn delete(recipes: &mut Vec<Recipe>, id: RecipeId) {
    recipes.retain(|r| r.id != id);
}

/// Append a batch of candidate records, reassigning any id that is
/// missing or collides with the collection or the batch-in-progress.
/// Returns the records as appended.
pub fn import(recipes: &mut Vec<Recipe>, batch: Vec<RecipeDraft>) -> Vec<Recipe> {
    let mut appended = Vec::with_capacity(batch.len());
    for draft in batch {
        appended.push(create(recipes, draft));
    }
    appended
}

/// Narrow the collection by derived platform and/or exact category.
/// Both predicates must match when both are present.
pub fn filter(recipes: &[Recipe], platform: Option<&str>, category: Option<&str>) -> Vec<Recipe> {
    recipes
        .iter()
        .filter(|r| match platform {
            Some(p) => r.platform().map(|d| d.as_str() == p).unwrap_or(false),
            None => true,
        })
        .filter(|r| match category {
            Some(c) => r.category() == Some(c),
            None => true,
        })
        .cloned()
        .collect()
}
