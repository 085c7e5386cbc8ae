//! The locked-update coordinator: read-modify-write against the
//! collection document.
//!
//! There is no real lock. Each update loads the freshest observable
//! snapshot, applies the mutation to a private copy, and saves back
//! conditionally on the revision it read. A concurrent writer makes the
//! conditional save fail with [`LarderError::Conflict`]; the caller
//! decides whether to retry, and nothing is ever silently lost.

use std::sync::Arc;

use ladleproto::Recipe;
use thiserror::Error;

use crate::store::CollectionStore;
use crate::LarderError;

/// Failure of one coordinated update.
#[derive(Debug, Error)]
pub enum UpdateError<E> {
    /// The mutation itself refused (e.g. target record not found). The
    /// save was never attempted.
    #[error("{0}")]
    Domain(E),

    /// Load or conditional save failed.
    #[error(transparent)]
    Storage(#[from] LarderError),
}

/// Serializes read-modify-write cycles against one collection store.
#[derive(Clone)]
pub struct Coordinator {
    store: Arc<dyn CollectionStore>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Load the current collection for a read-only request.
    pub async fn read(&self) -> Result<Vec<Recipe>, LarderError> {
        Ok(self.store.load().await?.recipes)
    }

    /// Apply `mutation` to the freshest observable snapshot and persist
    /// the result. The mutation returns the new collection together with
    /// an outcome (typically the authoritative record) that is handed
    /// back to the caller once the save succeeds.
    ///
    /// A domain failure from the mutation propagates without touching
    /// the store; a revision mismatch on save surfaces as
    /// [`LarderError::Conflict`].
    pub async fn perform_update<F, R, E>(&self, mutation: F) -> Result<R, UpdateError<E>>
    where
        F: FnOnce(Vec<Recipe>) -> Result<(Vec<Recipe>, R), E>,
    {
        let loaded = self.store.load().await?;
        let revision = loaded.revision;

        let (mutated, outcome) = mutation(loaded.recipes).map_err(UpdateError::Domain)?;

        self.store
            .save(&mutated, &revision)
            .await
            .map_err(UpdateError::Storage)?;

        Ok(outcome)
    }
}
