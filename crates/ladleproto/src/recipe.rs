//! Recipe records and the request shapes that mutate them.
//!
//! The collection is a flat JSON array of these records. A record is
//! either a linked recipe (bookmarked URL, optional category) or a
//! custom recipe (free-text ingredients). On the wire the presence of
//! `ingredients` decides the variant; in Rust the variant is explicit.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identity of a recipe within the collection.
///
/// Assigned at creation from the epoch-millisecond clock and never
/// reassigned. Negative values are client-side temporaries awaiting
/// server confirmation and must never be persisted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl RecipeId {
    /// True for client-side temporary ids.
    pub fn is_temporary(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two recipe variants. Exactly one holds for any record.
///
/// Untagged on purpose: the legacy document has no discriminant field.
/// `Custom` is listed first so that `ingredients` presence wins, which
/// matches the original `'ingredients' in recipe` check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeKind {
    Custom {
        ingredients: String,
    },
    Linked {
        #[serde(default)]
        link: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
}

/// One saved recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(flatten)]
    pub kind: RecipeKind,
}

impl Recipe {
    /// Platform derived from the link. Custom recipes have none.
    pub fn platform(&self) -> Option<Platform> {
        match &self.kind {
            RecipeKind::Linked { link, .. } => Platform::from_link(link),
            RecipeKind::Custom { .. } => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            RecipeKind::Linked { category, .. } => category.as_deref(),
            RecipeKind::Custom { .. } => None,
        }
    }

    pub fn link(&self) -> Option<&str> {
        match &self.kind {
            RecipeKind::Linked { link, .. } => Some(link.as_str()),
            RecipeKind::Custom { .. } => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, RecipeKind::Custom { .. })
    }
}

/// Body of a create request. The id is a suggestion: the server honors
/// it when free and assigns a fresh one otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecipeId>,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(flatten)]
    pub kind: RecipeKind,
}

impl RecipeDraft {
    /// Materialize the draft with its assigned identity.
    pub fn into_recipe(self, id: RecipeId) -> Recipe {
        Recipe {
            id,
            title: self.title,
            thumbnail: self.thumbnail,
            kind: self.kind,
        }
    }
}

/// Body of an update request. Every field is optional; set fields are
/// shallow-merged over the existing record and the id is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
}

impl RecipePatch {
    /// Merge the patch into a record, preserving its id and keeping the
    /// variants exclusive: a patch carrying `ingredients` produces a
    /// custom recipe, a patch carrying `link` or `category` produces a
    /// linked one, and a patch touching neither leaves the kind alone.
    pub fn apply_to(&self, recipe: &mut Recipe) {
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            recipe.thumbnail = thumbnail.clone();
        }

        if let Some(ingredients) = &self.ingredients {
            recipe.kind = RecipeKind::Custom {
                ingredients: ingredients.clone(),
            };
        } else if self.link.is_some() || self.category.is_some() {
            let (mut link, mut category) = match &recipe.kind {
                RecipeKind::Linked { link, category } => (link.clone(), category.clone()),
                RecipeKind::Custom { .. } => (String::new(), None),
            };
            if let Some(new_link) = &self.link {
                link = new_link.clone();
            }
            if let Some(new_category) = &self.category {
                category = if new_category.is_empty() {
                    None
                } else {
                    Some(new_category.clone())
                };
            }
            recipe.kind = RecipeKind::Linked { link, category };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn linked(id: i64, title: &str, link: &str) -> Recipe {
        Recipe {
            id: RecipeId(id),
            title: title.to_string(),
            thumbnail: String::new(),
            kind: RecipeKind::Linked {
                link: link.to_string(),
                category: None,
            },
        }
    }

    #[test]
    fn ingredients_presence_selects_custom_variant() {
        let json = r#"{"id": 1, "title": "Soup", "thumbnail": "", "ingredients": "water, salt"}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.is_custom());
        assert_eq!(recipe.platform(), None);
    }

    #[test]
    fn absence_of_ingredients_selects_linked_variant() {
        let json = r#"{"id": 2, "title": "Pasta", "link": "https://youtube.com/x", "category": "dinner"}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(!recipe.is_custom());
        assert_eq!(recipe.platform(), Some(Platform::Youtube));
        assert_eq!(recipe.category(), Some("dinner"));
    }

    #[test]
    fn custom_never_serializes_link_or_category() {
        let recipe = Recipe {
            id: RecipeId(3),
            title: "Bread".to_string(),
            thumbnail: String::new(),
            kind: RecipeKind::Custom {
                ingredients: "flour, water, yeast".to_string(),
            },
        };
        let value = serde_json::to_value(&recipe).unwrap();
        assert!(value.get("link").is_none());
        assert!(value.get("category").is_none());
        assert_eq!(value["ingredients"], "flour, water, yeast");
    }

    #[test]
    fn linked_never_serializes_ingredients() {
        let value = serde_json::to_value(linked(4, "Tacos", "https://tiktok.com/v")).unwrap();
        assert!(value.get("ingredients").is_none());
        assert_eq!(value["link"], "https://tiktok.com/v");
    }

    #[test]
    fn round_trip_preserves_record() {
        let original = linked(5, "Stew", "https://instagram.com/p/abc");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn patch_with_ingredients_converts_to_custom() {
        let mut recipe = linked(6, "Wrap", "https://youtu.be/z");
        let patch = RecipePatch {
            ingredients: Some("tortilla, beans".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut recipe);
        assert!(recipe.is_custom());
        assert_eq!(recipe.link(), None);
        assert_eq!(recipe.id, RecipeId(6));
    }

    #[test]
    fn patch_with_link_converts_custom_to_linked() {
        let mut recipe = Recipe {
            id: RecipeId(7),
            title: "Curry".to_string(),
            thumbnail: String::new(),
            kind: RecipeKind::Custom {
                ingredients: "spices".to_string(),
            },
        };
        let patch = RecipePatch {
            link: Some("https://tiktok.com/@a/video/9".to_string()),
            category: Some("dinner".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut recipe);
        assert!(!recipe.is_custom());
        assert_eq!(recipe.platform(), Some(Platform::Tiktok));
        assert_eq!(recipe.category(), Some("dinner"));
    }

    #[test]
    fn patch_without_variant_fields_keeps_kind() {
        let mut recipe = linked(8, "Old title", "https://youtube.com/q");
        let patch = RecipePatch {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut recipe);
        assert_eq!(recipe.title, "New title");
        assert_eq!(recipe.link(), Some("https://youtube.com/q"));
    }

    #[test]
    fn empty_category_patch_clears_category() {
        let mut recipe = Recipe {
            id: RecipeId(9),
            title: "Salad".to_string(),
            thumbnail: String::new(),
            kind: RecipeKind::Linked {
                link: "https://youtube.com/s".to_string(),
                category: Some("lunch".to_string()),
            },
        };
        let patch = RecipePatch {
            category: Some(String::new()),
            ..Default::default()
        };
        patch.apply_to(&mut recipe);
        assert_eq!(recipe.category(), None);
    }

    #[test]
    fn draft_with_suggested_id_parses() {
        let json = r#"{"id": 42, "title": "Pho", "link": "https://youtube.com/p"}"#;
        let draft: RecipeDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.id, Some(RecipeId(42)));
        let recipe = draft.into_recipe(RecipeId(42));
        assert_eq!(recipe.id, RecipeId(42));
    }
}
