//! skillet - Client-side library and CLI for the ladle server.
//!
//! The browser UI and this CLI share the same problem: keep a local
//! mirror of the collection responsive while mutations race a
//! non-transactional server. The answer here is a three-layer split:
//!
//! - [`cache`]: the state container holding the full mirror, plus the
//!   filter engine that derives every displayed list from it
//! - [`optimistic`]: the per-mutation ledger tracking Pending,
//!   Confirmed, and RolledBack states
//! - [`session`]: the controller that applies a mutation locally first,
//!   confirms it against the server's authoritative response, and rolls
//!   back to the pre-mutation snapshot on failure
//!
//! All reconciliation is by stable key (the record id, or the negative
//! temporary id of an unconfirmed create), never by list position, so
//! responses arriving out of order against different records are safe.

pub mod cache;
pub mod client;
pub mod optimistic;
pub mod session;

pub use cache::{FilterState, RecipeCache, SortMode};
pub use client::{HttpTransport, RecipeTransport, TransportError};
pub use optimistic::{MutationKind, MutationLedger, MutationState};
pub use session::Session;
