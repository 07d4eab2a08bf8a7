/*!
 * The persistence contract the reconciliation layer relies on.
 */

use async_trait::async_trait;
use regex::Regex;
use std::fmt::Debug;

use super::models::{EntryId, EntryUpdate, NewTranslation, TranslationEntry};
use crate::errors::StoreError;

/// Which stored entries a `find` selects
#[derive(Debug, Clone)]
pub enum MatchSpec {
    /// Every entry
    All,
    /// Entries whose `origin.main` contains `term`, ignoring case
    ///
    /// `pattern` is the compiled literal form of `term` and decides the
    /// match; stores may use `term` to narrow their candidates first.
    OriginMainContains { term: String, pattern: Regex },
}

impl MatchSpec {
    /// Whether an entry is selected
    pub fn matches(&self, entry: &TranslationEntry) -> bool {
        match self {
            MatchSpec::All => true,
            MatchSpec::OriginMainContains { pattern, .. } => pattern.is_match(&entry.origin.main),
        }
    }
}

/// Minimal CRUD capability of a translation store
///
/// Implementations own identity assignment and must be safe to share
/// between concurrent operations.
#[async_trait]
pub trait TranslationStore: Send + Sync + Debug {
    /// Find up to `limit` entries selected by `spec`
    async fn find(&self, spec: &MatchSpec, limit: usize) -> Result<Vec<TranslationEntry>, StoreError>;

    /// Persist one new entry and return it with its assigned identity
    async fn create(&self, entry: NewTranslation) -> Result<TranslationEntry, StoreError>;

    /// Persist several new entries, all or nothing
    async fn create_many(
        &self,
        entries: Vec<NewTranslation>,
    ) -> Result<Vec<TranslationEntry>, StoreError>;

    /// Apply changes to one entry
    ///
    /// Returns the entry as stored after the write, or `None` if no entry
    /// has this identity.
    async fn update_by_id(
        &self,
        id: &EntryId,
        changes: EntryUpdate,
    ) -> Result<Option<TranslationEntry>, StoreError>;

    /// Remove one entry, returning it, or `None` if it did not exist
    async fn delete_by_id(&self, id: &EntryId) -> Result<Option<TranslationEntry>, StoreError>;

    /// Release the store; later operations fail with `StoreError::Closed`
    async fn close(&self) -> Result<(), StoreError>;
}
