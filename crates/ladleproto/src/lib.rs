//! ladleproto - Shared domain types for the ladle recipe-bookmark manager
//!
//! This crate defines the types exchanged between the ladle server, the
//! skillet client, and the larder persistence layer. Keeping them in one
//! place means the wire shape is defined exactly once.
//!
//! ## Wire compatibility
//!
//! The persisted document and the REST bodies use the legacy flat shape:
//! a recipe is a JSON object whose variant is decided by the presence of
//! the `ingredients` field. Internally the variant is an explicit sum
//! type ([`RecipeKind`]); the presence check lives only at the serde
//! boundary, never in domain logic.
//!
//! ## Identity
//!
//! Recipe ids are epoch-millisecond values assigned at creation and never
//! reassigned. Negative ids are reserved for client-side temporary
//! records that have not yet been confirmed by the server.

pub mod platform;
pub mod recipe;

pub use platform::Platform;
pub use recipe::{Recipe, RecipeDraft, RecipeId, RecipeKind, RecipePatch};
