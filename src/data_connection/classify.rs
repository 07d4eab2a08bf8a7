/*!
 * Splitting a submitted batch into creates and updates.
 */

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::models::{BatchInput, EntryPayload, EntryUpdate, NewTranslation, PendingUpdate};

/// The two partitions of a classified batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    /// Entries without identity, stamped for creation
    pub to_create: Vec<NewTranslation>,
    /// Entries with identity, stamped for update
    pub to_update: Vec<PendingUpdate>,
}

impl Classified {
    /// Total number of classified entries
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len()
    }

    /// Whether both partitions are empty
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty()
    }
}

/// Partition a batch, using `now` as the single timestamp for every entry
///
/// Invalid input yields two empty partitions.
pub fn classify(input: BatchInput, now: DateTime<Utc>) -> Classified {
    match input {
        BatchInput::Many(items) => classify_many(items, now),
        BatchInput::Single(item) => classify_many(vec![item], now),
        BatchInput::Invalid => {
            debug!("Nothing to classify in an invalid batch");
            Classified::default()
        }
    }
}

fn classify_many(items: Vec<EntryPayload>, now: DateTime<Utc>) -> Classified {
    let mut classified = Classified::default();

    for item in items {
        match item.identity() {
            Some(id) => {
                let creation_date = item.creation_date.as_ref().and_then(|raw| {
                    let parsed = raw.to_datetime();
                    if parsed.is_none() {
                        warn!("Ignoring unparseable creationDate {:?} of translation {}", raw, id);
                    }
                    parsed
                });
                classified.to_update.push(PendingUpdate {
                    id,
                    changes: EntryUpdate {
                        origin: item.origin,
                        kind: item.kind,
                        translation: item.translation,
                        creation_date,
                        edit_date: now,
                    },
                });
            }
            None => classified.to_create.push(NewTranslation::from_payload(item, now)),
        }
    }

    debug!(
        "Classified batch: {} to create, {} to update",
        classified.to_create.len(),
        classified.to_update.len()
    );
    classified
}
