//! In-memory list of imported credentials.
//!
//! Holds the most recent import batch in file order. A new import replaces
//! the whole list; rows are removed one at a time by id.

use serde::{Deserialize, Serialize};

use crate::otp::types::*;

/// Whether the list currently holds anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    Empty,
    Populated,
}

/// Ordered, mutable collection of imported credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialList {
    entries: Vec<ListedCredential>,
}

impl CredentialList {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutation ─────────────────────────────────────────────────

    /// Discard everything and store `credentials` in input order, each
    /// under a freshly assigned id.
    pub fn replace_all<I>(&mut self, credentials: I) -> &[ListedCredential]
    where
        I: IntoIterator<Item = Credential>,
    {
        self.entries = credentials
            .into_iter()
            .map(ListedCredential::assign)
            .collect();
        log::debug!("credential list replaced ({} entries)", self.entries.len());
        &self.entries
    }

    /// Remove the entry with `id`. Unknown ids are ignored.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => {
                log::debug!("remove ignored, no entry with id {}", id);
                false
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> ListState {
        if self.is_empty() {
            ListState::Empty
        } else {
            ListState::Populated
        }
    }

    /// Read-only view of the entries, in display order.
    pub fn list(&self) -> &[ListedCredential] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ListedCredential> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Id of the entry at a 1-based display row.
    pub fn id_at(&self, row: usize) -> Option<&str> {
        row.checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .map(|e| e.id.as_str())
    }

    pub fn credentials(&self) -> impl Iterator<Item = &Credential> {
        self.entries.iter().map(|e| &e.credential)
    }
}

/// Count label shown next to the list ("1 item", "3 items").
pub fn count_label(count: usize) -> String {
    format!("{} item{}", count, if count == 1 { "" } else { "s" })
}
