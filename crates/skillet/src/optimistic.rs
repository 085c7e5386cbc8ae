//! Per-mutation bookkeeping for the optimistic update protocol.
//!
//! Every locally applied mutation gets a ledger entry keyed by the
//! record it touches. Entries move Pending -> Confirmed on a successful
//! server response, or Pending -> RolledBack when the response fails
//! and the cache is restored from its snapshot.

use ladleproto::RecipeId;

/// Issues temporary ids for unconfirmed creates.
///
/// Temporary ids are negative so they can never collide with a
/// server-assigned epoch-millisecond id, and so a leak into a persisted
/// document is detectable.
#[derive(Debug, Default)]
pub struct TempIds {
    next: i64,
}

impl TempIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> RecipeId {
        self.next -= 1;
        RecipeId(self.next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    /// Applied locally, server response outstanding.
    Pending,
    /// Server accepted; the cache holds the authoritative record.
    Confirmed,
    /// Server rejected; the cache was restored to its snapshot.
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct MutationEntry {
    pub key: RecipeId,
    pub kind: MutationKind,
    pub state: MutationState,
}

/// Append-only record of mutations issued this session.
#[derive(Debug, Default)]
pub struct MutationLedger {
    entries: Vec<MutationEntry>,
}

impl MutationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new entry in the Pending state and return its index.
    pub fn begin(&mut self, key: RecipeId, kind: MutationKind) -> usize {
        self.entries.push(MutationEntry {
            key,
            kind,
            state: MutationState::Pending,
        });
        self.entries.len() - 1
    }

    pub fn confirm(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.state = MutationState::Confirmed;
        }
    }

    pub fn roll_back(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.state = MutationState::RolledBack;
        }
    }

    pub fn entries(&self) -> &[MutationEntry] {
        &self.entries
    }

    pub fn pending(&self) -> impl Iterator<Item = &MutationEntry> {
        self.entries
            .iter()
            .filter(|e| e.state == MutationState::Pending)
    }
}
