/*!
 * Translation reconciliation layer.
 *
 * This module sits between the HTTP routes and the store:
 * - `escape`: sanitizing search terms before they become patterns
 * - `classify`: splitting a submitted batch into creates and updates
 * - `settle`: joining independent fallible operations into one result
 * - `store`: the persistence contract
 * - `models`: entries, payloads and the tagged batch input
 *
 * `DataConnection` ties them together. Batch operations never fail as a
 * whole because one of their parts failed: a failing part is logged and
 * contributes nothing to the result.
 */

pub mod classify;
pub mod escape;
pub mod models;
pub mod settle;
pub mod store;

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use regex::RegexBuilder;
use std::sync::Arc;

use crate::errors::DataConnectionError;
use classify::{Classified, classify};
use escape::{escape_special_characters, literal_pattern};
use models::{BatchInput, EntryPayload, NewTranslation, PendingUpdate, TranslationEntry};
use settle::{SettleOp, settle_all};
use store::{MatchSpec, TranslationStore};

pub use models::EntryId;

/// Default cap on the number of search results
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// One independently settling result channel of a batch
pub type OutcomeChannel = BoxFuture<'static, Result<Vec<TranslationEntry>, DataConnectionError>>;

/// The two result channels of a reconciliation call
pub struct BatchOutcome {
    /// Entries created from the identity-less part of the batch
    pub added: OutcomeChannel,
    /// Entries updated from the part of the batch with identity
    pub updated: OutcomeChannel,
}

impl BatchOutcome {
    /// Resolve both channels and merge what they produced
    ///
    /// Waits for both channels to settle. A failed channel contributes no
    /// entries. The order between added and updated entries follows
    /// settlement order and is not fixed.
    pub async fn combined(self) -> Vec<TranslationEntry> {
        let channels: Vec<SettleOp<'static, TranslationEntry, DataConnectionError>> = vec![
            log_channel_failure("add", self.added),
            log_channel_failure("update", self.updated),
        ];
        settle_all(channels).await
    }

    /// Resolve both channels and return their individual outcomes
    pub async fn settle(self) -> (
        Result<Vec<TranslationEntry>, DataConnectionError>,
        Result<Vec<TranslationEntry>, DataConnectionError>,
    ) {
        futures::join!(self.added, self.updated)
    }
}

fn log_channel_failure(name: &'static str, channel: OutcomeChannel) -> OutcomeChannel {
    async move {
        let outcome = channel.await;
        if let Err(e) = &outcome {
            warn!("The {} part of a translation batch failed: {}", name, e);
        }
        outcome
    }
    .boxed()
}

/// Reconciliation and search over a translation store
#[derive(Debug, Clone)]
pub struct DataConnection {
    store: Arc<dyn TranslationStore>,
    max_results: usize,
}

impl DataConnection {
    /// Create a connection with the default search cap
    pub fn new(store: Arc<dyn TranslationStore>) -> Self {
        Self::with_max_results(store, DEFAULT_MAX_RESULTS)
    }

    /// Create a connection with an explicit search cap
    pub fn with_max_results(store: Arc<dyn TranslationStore>, max_results: usize) -> Self {
        Self { store, max_results }
    }

    /// Maximum number of entries a search returns
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Search entries whose source text contains `term`, ignoring case
    ///
    /// The term is matched literally. Store failures are returned, never
    /// turned into an empty result.
    pub async fn search_translation(
        &self,
        term: &str,
    ) -> Result<Vec<TranslationEntry>, DataConnectionError> {
        let escaped = escape_special_characters(term);
        let pattern = RegexBuilder::new(&literal_pattern(&escaped))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                error!("Could not compile search pattern for '{}': {}", term, e);
                DataConnectionError::from(e)
            })?;

        let spec = MatchSpec::OriginMainContains {
            term: term.to_string(),
            pattern,
        };
        match self.store.find(&spec, self.max_results).await {
            Ok(found) => {
                debug!("Search for '{}' matched {} translations", term, found.len());
                Ok(found)
            }
            Err(e) => {
                error!("Error while searching for a translation. Pattern: {}: {}", escaped, e);
                Err(e.into())
            }
        }
    }

    /// Submit a batch of new and existing entries
    ///
    /// Entries without identity are created, entries with identity are
    /// updated. Invalid input yields two empty channels.
    pub fn update_translation(&self, input: BatchInput) -> BatchOutcome {
        debug!("Reconciling {} translation input", input.shape());
        let Classified { to_create, to_update } = classify(input, Utc::now());
        BatchOutcome {
            added: self.create_many(to_create),
            updated: self.update_many(to_update),
        }
    }

    /// Create entries, all or nothing
    pub fn create_many(&self, entries: Vec<NewTranslation>) -> OutcomeChannel {
        let store = Arc::clone(&self.store);
        async move {
            let created = match entries.len() {
                0 => return Ok(Vec::new()),
                1 => {
                    info!("Attempt to add single translation to database");
                    let mut entries = entries;
                    let entry = entries.remove(0);
                    store.create(entry).await.map(|created| vec![created])
                }
                count => {
                    info!("Attempt to add {} translations to database", count);
                    store.create_many(entries).await
                }
            };

            match created {
                Ok(created) => {
                    for entry in &created {
                        info!("Added translation {}", entry.id);
                    }
                    Ok(created)
                }
                Err(e) => {
                    error!("Failed adding translations: {}", e);
                    Err(e.into())
                }
            }
        }
        .boxed()
    }

    /// Update entries independently of each other
    ///
    /// Resolves with the entries whose update succeeded, in completion
    /// order. Failed or missing targets are logged and left out. Each
    /// entry is the row as stored after the write, so fields the input
    /// left out carry their stored values and `creation_date` is the
    /// stored one.
    pub fn update_many(&self, updates: Vec<PendingUpdate>) -> OutcomeChannel {
        let store = Arc::clone(&self.store);
        async move {
            if updates.is_empty() {
                return Ok(Vec::new());
            }

            let requested = updates.len();
            let ops: Vec<SettleOp<'static, TranslationEntry, DataConnectionError>> = updates
                .into_iter()
                .map(|update| update_single(Arc::clone(&store), update))
                .collect();

            let updated = settle_all(ops).await;
            info!("Updated {} of {} translations", updated.len(), requested);
            Ok(updated)
        }
        .boxed()
    }

    /// Delete one entry or a list of entries
    ///
    /// Only input that is neither an entry nor a list is rejected. Entries
    /// without identity, unknown identities and failed deletions contribute
    /// nothing to the result.
    pub async fn delete_translation(
        &self,
        input: BatchInput,
    ) -> Result<Vec<TranslationEntry>, DataConnectionError> {
        let items = match input {
            BatchInput::Many(items) => items,
            BatchInput::Single(item) => vec![item],
            BatchInput::Invalid => {
                let err = DataConnectionError::InvalidInput(
                    "expected a translation or a list of translations".to_string(),
                );
                warn!("Error while deleting a translation: {}", err);
                return Err(err);
            }
        };

        let requested = items.len();
        let ops: Vec<SettleOp<'static, TranslationEntry, DataConnectionError>> = items
            .into_iter()
            .map(|item| delete_single(Arc::clone(&self.store), item))
            .collect();

        let deleted = settle_all(ops).await;
        info!("Deleted {} of {} requested translations", deleted.len(), requested);
        Ok(deleted)
    }

    /// Close the underlying store
    pub async fn close(&self) -> Result<(), DataConnectionError> {
        self.store.close().await.map_err(|e| {
            error!("Failed to close the translation store: {}", e);
            DataConnectionError::from(e)
        })
    }
}

fn update_single(
    store: Arc<dyn TranslationStore>,
    update: PendingUpdate,
) -> SettleOp<'static, TranslationEntry, DataConnectionError> {
    async move {
        let PendingUpdate { id, changes } = update;
        match store.update_by_id(&id, changes).await {
            Ok(Some(entry)) => {
                info!("Updated translation {}", entry.id);
                Ok(vec![entry])
            }
            Ok(None) => {
                warn!("Failed updating translation {}: no such translation", id);
                Ok(Vec::new())
            }
            Err(e) => {
                warn!("Failed updating translation {}: {}", id, e);
                Err(e.into())
            }
        }
    }
    .boxed()
}

fn delete_single(
    store: Arc<dyn TranslationStore>,
    item: EntryPayload,
) -> SettleOp<'static, TranslationEntry, DataConnectionError> {
    async move {
        let Some(id) = item.identity() else {
            let err = DataConnectionError::MissingIdentity;
            warn!("Error while trying to delete a translation: {}", err);
            return Err(err);
        };

        match store.delete_by_id(&id).await {
            Ok(Some(deleted)) => {
                info!("Deleted translation {}", deleted.id);
                Ok(vec![deleted])
            }
            Ok(None) => {
                debug!("Translation {} not found, nothing deleted", id);
                Ok(Vec::new())
            }
            Err(e) => {
                warn!("Error while trying to delete translation {}: {}", id, e);
                Err(e.into())
            }
        }
    }
    .boxed()
}
