//! larder - Persistence layer for the ladle recipe collection.
//!
//! The whole collection lives in one JSON document: an array of recipe
//! objects, human-formatted so it stays readable and diffable. Two
//! backends hold that document:
//!
//! - [`FileStore`]: a file on the local filesystem
//! - [`BlobStore`]: a single named object behind an HTTP blob store
//!
//! Both implement [`CollectionStore`] and tag every load with a
//! [`Revision`] so that writes can be made conditional: a save succeeds
//! only if the document still carries the revision the writer read.
//! There is no lock service here; the conditional write is the only
//! defense against concurrent writers, and a losing writer gets a
//! [`LarderError::Conflict`] instead of silently clobbering the other
//! write.
//!
//! The [`Coordinator`] packages the read-modify-write cycle: load the
//! freshest observable snapshot, apply a mutation to a private copy,
//! save conditionally. A domain failure inside the mutation (say, the
//! target record does not exist) skips the save entirely.
//!
//! Absence of the document is a normal state (empty collection), but a
//! document that exists and fails to parse is corrupt and every request
//! touching it fails loudly. Serving corrupt state as "no data" would
//! invite the next save to erase the collection.

pub mod access;
pub mod blob;
pub mod coordinator;
pub mod store;

pub use access::LoginLog;
pub use blob::BlobStore;
pub use coordinator::{Coordinator, UpdateError};
pub use store::{CollectionStore, FileStore, Revision, Versioned};

use std::path::PathBuf;
use thiserror::Error;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum LarderError {
    /// The persisted document exists but is not valid JSON. Fatal to the
    /// affected request; never masked as an empty collection.
    #[error("persisted document is corrupt: {0}")]
    Corrupt(String),

    /// The conditional write lost: the document changed between the load
    /// and the save.
    #[error("collection changed since it was read")]
    Conflict,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("blob transport error: {0}")]
    Transport(String),
}
