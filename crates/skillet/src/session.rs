//! The session controller: optimistic mutations over a cached mirror.
//!
//! Every mutation follows the same shape. Snapshot the cache, apply the
//! change locally, send the request, then either reconcile the cache
//! with the server's authoritative record or restore the snapshot. The
//! rule is uniform across create, update, and delete; there is no
//! fire-and-forget path.

use ladleproto::{Recipe, RecipeDraft, RecipeId, RecipePatch};

use crate::cache::{FilterState, RecipeCache};
use crate::client::{RecipeTransport, TransportError};
use crate::optimistic::{MutationKind, MutationLedger, TempIds};

pub struct Session<T: RecipeTransport> {
    transport: T,
    cache: RecipeCache,
    pub filters: FilterState,
    temp_ids: TempIds,
    ledger: MutationLedger,
}

impl<T: RecipeTransport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cache: RecipeCache::new(),
            filters: FilterState::default(),
            temp_ids: TempIds::new(),
            ledger: MutationLedger::new(),
        }
    }

    /// Replace the mirror with the server's current collection.
    pub async fn refresh(&mut self) -> Result<(), TransportError> {
        let recipes = self.transport.list().await?;
        self.cache.set_collection(recipes);
        Ok(())
    }

    /// The list as the user currently sees it.
    pub fn displayed(&self) -> Vec<Recipe> {
        self.cache.recompute(&self.filters)
    }

    pub fn cache(&self) -> &RecipeCache {
        &self.cache
    }

    pub fn ledger(&self) -> &MutationLedger {
        &self.ledger
    }

    /// Create a recipe. The draft appears immediately under a negative
    /// temporary id; on confirmation it is swapped for the server's
    /// record (keyed by the temporary id, not by position).
    pub async fn create(&mut self, draft: RecipeDraft) -> Result<Recipe, TransportError> {
        let snapshot = self.cache.snapshot();
        let temp_id = self.temp_ids.next();
        self.cache.insert(draft.clone().into_recipe(temp_id));
        let entry = self.ledger.begin(temp_id, MutationKind::Create);

        // The temporary id must never leave the client
        let outgoing = RecipeDraft { id: None, ..draft };

        match self.transport.create(outgoing).await {
            Ok(created) => {
                self.cache.reconcile(temp_id, created.clone());
                self.ledger.confirm(entry);
                Ok(created)
            }
            Err(e) => {
                self.cache.restore(snapshot);
                self.ledger.roll_back(entry);
                Err(e)
            }
        }
    }

    /// Update a recipe. The patch is merged locally right away, then
    /// the cached record is overwritten with the server's merged copy.
    pub async fn update(
        &mut self,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, TransportError> {
        let snapshot = self.cache.snapshot();
        self.cache.patch(id, &patch);
        let entry = self.ledger.begin(id, MutationKind::Update);

        match self.transport.update(id, &patch).await {
            Ok(merged) => {
                self.cache.reconcile(id, merged.clone());
                self.ledger.confirm(entry);
                Ok(merged)
            }
            Err(e) => {
                self.cache.restore(snapshot);
                self.ledger.roll_back(entry);
                Err(e)
            }
        }
    }

    /// Delete a recipe. The record disappears immediately and comes
    /// back if the server refuses, same rollback rule as the others.
    pub async fn delete(&mut self, id: RecipeId) -> Result<(), TransportError> {
        let snapshot = self.cache.snapshot();
        self.cache.remove(id);
        let entry = self.ledger.begin(id, MutationKind::Delete);

        match self.transport.delete(id).await {
            Ok(()) => {
                self.ledger.confirm(entry);
                Ok(())
            }
            Err(e) => {
                self.cache.restore(snapshot);
                self.ledger.roll_back(entry);
                Err(e)
            }
        }
    }

    /// Bulk import, then reload: the server decides every final id, so
    /// a wholesale refresh is simpler than reconciling a batch.
    pub async fn import(&mut self, drafts: Vec<RecipeDraft>) -> Result<usize, TransportError> {
        let appended = self.transport.import(drafts).await?;
        let count = appended.len();
        self.refresh().await?;
        Ok(count)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), TransportError> {
        self.transport.login(username, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimistic::MutationState;
    use async_trait::async_trait;
    use ladleproto::RecipeKind;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;

    /// In-memory stand-in for the server, with switchable failure.
    #[derive(Default)]
    struct FakeTransport {
        recipes: Mutex<Vec<Recipe>>,
        next_id: AtomicI64,
        fail: AtomicBool,
    }

    impl FakeTransport {
        fn seeded(recipes: Vec<Recipe>) -> Self {
            let next = recipes.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
            Self {
                recipes: Mutex::new(recipes),
                next_id: AtomicI64::new(next),
                fail: AtomicBool::new(false),
            }
        }

        fn fail_next(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        fn check_failure(&self) -> Result<(), TransportError> {
            if self.fail.swap(false, Ordering::SeqCst) {
                Err(TransportError::Network("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RecipeTransport for &FakeTransport {
        async fn list(&self) -> Result<Vec<Recipe>, TransportError> {
            self.check_failure()?;
            Ok(self.recipes.lock().unwrap().clone())
        }

        async fn create(&self, draft: RecipeDraft) -> Result<Recipe, TransportError> {
            self.check_failure()?;
            let id = RecipeId(self.next_id.fetch_add(1, Ordering::SeqCst));
            let recipe = draft.into_recipe(id);
            self.recipes.lock().unwrap().push(recipe.clone());
            Ok(recipe)
        }

        async fn update(
            &self,
            id: RecipeId,
            patch: &RecipePatch,
        ) -> Result<Recipe, TransportError> {
            self.check_failure()?;
            let mut recipes = self.recipes.lock().unwrap();
            let recipe = recipes
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(TransportError::NotFound)?;
            patch.apply_to(recipe);
            Ok(recipe.clone())
        }

        async fn delete(&self, id: RecipeId) -> Result<(), TransportError> {
            self.check_failure()?;
            self.recipes.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }

        async fn import(&self, drafts: Vec<RecipeDraft>) -> Result<Vec<Recipe>, TransportError> {
            self.check_failure()?;
            let mut appended = Vec::new();
            for draft in drafts {
                let id = RecipeId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let recipe = draft.into_recipe(id);
                self.recipes.lock().unwrap().push(recipe.clone());
                appended.push(recipe);
            }
            Ok(appended)
        }

        async fn login(&self, _username: &str, _password: &str) -> Result<(), TransportError> {
            self.check_failure()
        }
    }

    fn linked_draft(title: &str, link: &str) -> RecipeDraft {
        RecipeDraft {
            id: None,
            title: title.to_string(),
            thumbnail: String::new(),
            kind: RecipeKind::Linked {
                link: link.to_string(),
                category: None,
            },
        }
    }

    fn seeded_transport() -> FakeTransport {
        FakeTransport::seeded(vec![
            linked_draft("Pasta", "https://youtube.com/x").into_recipe(RecipeId(1)),
            linked_draft("Tacos", "https://instagram.com/y").into_recipe(RecipeId(2)),
        ])
    }

    #[tokio::test]
    async fn confirmed_create_swaps_temp_record_for_server_record() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        let created = session
            .create(linked_draft("Soup", "https://tiktok.com/z"))
            .await
            .unwrap();

        assert!(!created.id.is_temporary());
        assert_eq!(session.cache().len(), 3);
        assert!(session.cache().all().iter().all(|r| !r.id.is_temporary()));
        assert_eq!(
            session.ledger().entries()[0].state,
            MutationState::Confirmed
        );
    }

    #[tokio::test]
    async fn failed_create_restores_the_snapshot() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        transport.fail_next();
        let err = session
            .create(linked_draft("Soup", "https://tiktok.com/z"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));

        assert_eq!(session.cache().len(), 2);
        assert_eq!(
            session.ledger().entries()[0].state,
            MutationState::RolledBack
        );
    }

    #[tokio::test]
    async fn update_applies_locally_then_takes_server_copy() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        let merged = session
            .update(
                RecipeId(1),
                RecipePatch {
                    title: Some("Better pasta".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(merged.title, "Better pasta");
        assert_eq!(
            session.cache().get(RecipeId(1)).unwrap().title,
            "Better pasta"
        );
    }

    #[tokio::test]
    async fn failed_update_restores_the_old_record() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        transport.fail_next();
        session
            .update(
                RecipeId(1),
                RecipePatch {
                    title: Some("Better pasta".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(session.cache().get(RecipeId(1)).unwrap().title, "Pasta");
    }

    #[tokio::test]
    async fn update_of_server_missing_record_rolls_back() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        // The mirror has drifted: it holds a record the server lost
        transport.recipes.lock().unwrap().retain(|r| r.id != RecipeId(2));

        let err = session
            .update(
                RecipeId(2),
                RecipePatch {
                    title: Some("Gone".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NotFound));
        assert_eq!(session.cache().get(RecipeId(2)).unwrap().title, "Tacos");
    }

    #[tokio::test]
    async fn failed_delete_brings_the_record_back() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        transport.fail_next();
        session.delete(RecipeId(1)).await.unwrap_err();

        assert_eq!(session.cache().len(), 2);
        assert!(session.cache().get(RecipeId(1)).is_some());
        assert_eq!(
            session.ledger().entries()[0].state,
            MutationState::RolledBack
        );
    }

    #[tokio::test]
    async fn confirmed_delete_stays_gone() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        session.delete(RecipeId(1)).await.unwrap();
        assert_eq!(session.cache().len(), 1);
        assert_eq!(transport.recipes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_never_sends_the_temporary_id() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        // A draft arriving with a stale temp id suggestion
        let mut draft = linked_draft("Soup", "https://tiktok.com/z");
        draft.id = Some(RecipeId(-4));
        let created = session.create(draft).await.unwrap();

        assert!(!created.id.is_temporary());
        assert!(transport
            .recipes
            .lock()
            .unwrap()
            .iter()
            .all(|r| !r.id.is_temporary()));
    }

    #[tokio::test]
    async fn import_reloads_the_full_collection() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        let count = session
            .import(vec![
                linked_draft("A", "https://youtube.com/a"),
                linked_draft("B", "https://youtube.com/b"),
            ])
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(session.cache().len(), 4);
    }

    #[tokio::test]
    async fn displayed_list_tracks_filters_through_mutations() {
        let transport = seeded_transport();
        let mut session = Session::new(&transport);
        session.refresh().await.unwrap();

        session.filters.platform = Some(ladleproto::Platform::Youtube);
        assert_eq!(session.displayed().len(), 1);

        session
            .create(linked_draft("More pasta", "https://youtube.com/q"))
            .await
            .unwrap();
        assert_eq!(session.displayed().len(), 2);

        session.delete(RecipeId(1)).await.unwrap();
        assert_eq!(session.displayed().len(), 1);
        assert_eq!(session.displayed()[0].title, "More pasta");
    }
}
