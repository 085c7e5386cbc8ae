//! CollectionStore trait and the local-file implementation.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use ladleproto::Recipe;

use crate::LarderError;

/// Identity of one observed state of the persisted document.
///
/// Locally this is a blake3 digest of the document bytes; the blob
/// backend prefers the store's ETag when one is returned. `Absent`
/// means the document did not exist at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Absent,
    Present(String),
}

impl Revision {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Revision::Present(format!("b3:{}", blake3::hash(bytes).to_hex()))
    }

    pub fn is_digest(&self) -> bool {
        matches!(self, Revision::Present(tag) if tag.starts_with("b3:"))
    }
}

/// A loaded collection together with the revision it was read at.
#[derive(Debug, Clone)]
pub struct Versioned {
    pub recipes: Vec<Recipe>,
    pub revision: Revision,
}

impl Versioned {
    pub fn empty() -> Self {
        Versioned {
            recipes: Vec::new(),
            revision: Revision::Absent,
        }
    }
}

/// Trait for collection document backends.
///
/// This allows alternative implementations (in-memory for testing, the
/// remote blob store, caching layers).
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Load the full collection. A missing document is a normal case and
    /// yields an empty collection with [`Revision::Absent`]; a document
    /// that exists but does not parse is [`LarderError::Corrupt`].
    async fn load(&self) -> Result<Versioned, LarderError>;

    /// Replace the full document, conditional on `expected` still being
    /// the current revision. Returns the revision of the written state
    /// or [`LarderError::Conflict`].
    async fn save(&self, recipes: &[Recipe], expected: &Revision) -> Result<Revision, LarderError>;
}

/// Serialize the collection the way it is persisted: an indented JSON
/// array, matching the historical on-disk format.
pub fn encode_document(recipes: &[Recipe]) -> Vec<u8> {
    // Vec<Recipe> serialization cannot fail
    serde_json::to_vec_pretty(recipes).unwrap_or_default()
}

fn decode_document(bytes: &[u8], origin: &str) -> Result<Vec<Recipe>, LarderError> {
    if bytes.is_empty() {
        // An empty file is how a fresh deployment often starts out
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes).map_err(|e| LarderError::Corrupt(format!("{origin}: {e}")))
}

/// Collection document stored as one file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Current revision of the file, without parsing it.
    fn current_revision(&self) -> Result<Revision, LarderError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Revision::of_bytes(&bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Revision::Absent),
            Err(e) => Err(LarderError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[async_trait]
impl CollectionStore for FileStore {
    async fn load(&self) -> Result<Versioned, LarderError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Versioned::empty()),
            Err(e) => {
                return Err(LarderError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let recipes = decode_document(&bytes, &self.path.display().to_string())?;
        Ok(Versioned {
            recipes,
            revision: Revision::of_bytes(&bytes),
        })
    }

    async fn save(&self, recipes: &[Recipe], expected: &Revision) -> Result<Revision, LarderError> {
        // Best-effort conditional write: re-hash the file just before
        // writing. A racing writer can still slip in between the check
        // and the write; the window is narrow and accepted.
        let current = self.current_revision()?;
        if current != *expected {
            return Err(LarderError::Conflict);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| LarderError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let bytes = encode_document(recipes);
        fs::write(&self.path, &bytes).map_err(|e| LarderError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), records = recipes.len(), "collection saved");
        Ok(Revision::of_bytes(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladleproto::{RecipeDraft, RecipeId, RecipeKind};
    use tempfile::TempDir;

    fn sample(id: i64, title: &str) -> Recipe {
        RecipeDraft {
            id: None,
            title: title.to_string(),
            thumbnail: String::new(),
            kind: RecipeKind::Linked {
                link: "https://youtube.com/x".to_string(),
                category: None,
            },
        }
        .into_recipe(RecipeId(id))
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_collection() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("recipes.json"));

        let loaded = store.load().await.unwrap();
        assert!(loaded.recipes.is_empty());
        assert_eq!(loaded.revision, Revision::Absent);
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("recipes.json"));

        let recipes = vec![sample(1, "Pasta"), sample(2, "Soup")];
        let revision = store.save(&recipes, &Revision::Absent).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.recipes, recipes);
        assert_eq!(loaded.revision, revision);
    }

    #[tokio::test]
    async fn document_is_human_formatted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipes.json");
        let store = FileStore::new(&path);

        store.save(&[sample(1, "Pasta")], &Revision::Absent).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'), "persisted document should be indented");
    }

    #[tokio::test]
    async fn stale_revision_is_a_conflict() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("recipes.json"));

        let first = store.save(&[sample(1, "Pasta")], &Revision::Absent).await.unwrap();
        store.save(&[sample(1, "Pasta"), sample(2, "Soup")], &first).await.unwrap();

        // A writer still holding `first` must lose
        let err = store.save(&[], &first).await.unwrap_err();
        assert!(matches!(err, LarderError::Conflict));

        // And the losing write changed nothing
        assert_eq!(store.load().await.unwrap().recipes.len(), 2);
    }

    #[tokio::test]
    async fn absent_expectation_conflicts_with_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("recipes.json"));

        store.save(&[sample(1, "Pasta")], &Revision::Absent).await.unwrap();

        let err = store.save(&[], &Revision::Absent).await.unwrap_err();
        assert!(matches!(err, LarderError::Conflict));
    }

    #[tokio::test]
    async fn corrupt_document_fails_loudly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, LarderError::Corrupt(_)));
    }

    #[tokio::test]
    async fn empty_file_is_an_empty_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, b"").unwrap();

        let store = FileStore::new(&path);
        let loaded = store.load().await.unwrap();
        assert!(loaded.recipes.is_empty());
        // The empty file still has a concrete revision
        assert!(matches!(loaded.revision, Revision::Present(_)));
    }
}
