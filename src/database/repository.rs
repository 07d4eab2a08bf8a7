/*!
 * Repository layer for database operations.
 *
 * This module implements the translation store contract on top of SQLite,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::connection::DatabaseConnection;
use super::models::{ENTRY_COLUMNS, entry_from_new, entry_from_row, format_timestamp, reject_blank};
use crate::data_connection::models::{EntryId, EntryUpdate, NewTranslation, TranslationEntry};
use crate::data_connection::store::{MatchSpec, TranslationStore};
use crate::errors::StoreError;

/// Case-folded containment test on `origin_main` against a lowercase needle
///
/// `lower()` folds ASCII only. The Kelvin sign and the long s fold to `k`
/// and `s` under Unicode rules, so they are mapped before comparing.
const CONTAINS_FOLDED: &str =
    "instr(lower(replace(replace(origin_main, char(8490), 'k'), char(383), 's')), ?1) > 0";

/// Needle for the SQL prefilter, `None` when every row has to be checked
///
/// Only ASCII terms are prefiltered: their case variants are all covered
/// by `CONTAINS_FOLDED`. The compiled pattern still decides every match.
fn containment_needle(spec: &MatchSpec) -> Option<String> {
    match spec {
        MatchSpec::OriginMainContains { term, .. } if term.is_ascii() => {
            Some(term.to_ascii_lowercase())
        }
        _ => None,
    }
}

/// SQLite-backed translation store
#[derive(Clone, Debug)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// The underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.db.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn get_sync(conn: &Connection, id: &str) -> Result<Option<TranslationEntry>> {
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM translations WHERE id = ?1", ENTRY_COLUMNS),
                [id],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn insert_sync(conn: &Connection, entry: &TranslationEntry) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO translations (
                id, origin_main, origin_short, kind, translation, creation_date, edit_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.id.as_str(),
                entry.origin.main,
                entry.origin.short,
                entry.kind,
                entry.translation,
                format_timestamp(&entry.creation_date),
                format_timestamp(&entry.edit_date),
            ],
        )?;
        Ok(())
    }

    /// Get an entry by identity
    pub async fn get(&self, id: &EntryId) -> Result<Option<TranslationEntry>, StoreError> {
        self.ensure_open()?;
        let id = id.to_string();
        Ok(self.db.execute_async(move |conn| Self::get_sync(conn, &id)).await?)
    }
}

#[async_trait]
impl TranslationStore for Repository {
    async fn find(
        &self,
        spec: &MatchSpec,
        limit: usize,
    ) -> Result<Vec<TranslationEntry>, StoreError> {
        self.ensure_open()?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        let spec = spec.clone();
        let needle = containment_needle(&spec);

        let found = self
            .db
            .execute_async(move |conn| {
                let filter = match &needle {
                    Some(_) => format!("WHERE {}", CONTAINS_FOLDED),
                    None => String::new(),
                };
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM translations {} ORDER BY rowid",
                    ENTRY_COLUMNS, filter
                ))?;
                let rows = stmt.query_map(params_from_iter(needle.iter()), entry_from_row)?;

                let mut found = Vec::new();
                for row in rows {
                    let entry = row?;
                    if spec.matches(&entry) {
                        found.push(entry);
                        if found.len() >= limit {
                            break;
                        }
                    }
                }
                Ok(found)
            })
            .await?;

        debug!("Store lookup matched {} translations", found.len());
        Ok(found)
    }

    async fn create(&self, entry: NewTranslation) -> Result<TranslationEntry, StoreError> {
        self.ensure_open()?;
        let entry = entry_from_new(entry, EntryId::generate())?;

        Ok(self
            .db
            .execute_async(move |conn| {
                Self::insert_sync(conn, &entry)?;
                Ok(entry)
            })
            .await?)
    }

    async fn create_many(
        &self,
        entries: Vec<NewTranslation>,
    ) -> Result<Vec<TranslationEntry>, StoreError> {
        self.ensure_open()?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        // Validate everything before touching the database
        let entries = entries
            .into_iter()
            .map(|new| entry_from_new(new, EntryId::generate()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self
            .db
            .transaction_async(move |tx| {
                for entry in &entries {
                    Self::insert_sync(tx, entry)?;
                }
                Ok(entries)
            })
            .await?)
    }

    async fn update_by_id(
        &self,
        id: &EntryId,
        changes: EntryUpdate,
    ) -> Result<Option<TranslationEntry>, StoreError> {
        self.ensure_open()?;
        let origin = changes.origin.clone().unwrap_or_default();
        reject_blank("origin.main", &origin.main)?;
        reject_blank("type", &changes.kind)?;
        reject_blank("translation", &changes.translation)?;
        let id = id.to_string();

        Ok(self
            .db
            .execute_async(move |conn| {
                let Some(stored) = Self::get_sync(conn, &id)? else {
                    return Ok(None);
                };

                // The creation date is written once, on insert
                if let Some(submitted) = changes.creation_date {
                    if submitted != stored.creation_date {
                        debug!(
                            "Keeping creation date {} of translation {}, ignoring {}",
                            stored.creation_date, id, submitted
                        );
                    }
                }

                conn.execute(
                    r#"
                    UPDATE translations
                    SET origin_main = COALESCE(?1, origin_main),
                        origin_short = COALESCE(?2, origin_short),
                        kind = COALESCE(?3, kind),
                        translation = COALESCE(?4, translation),
                        edit_date = ?5
                    WHERE id = ?6
                    "#,
                    params![
                        origin.main,
                        origin.short,
                        changes.kind,
                        changes.translation,
                        format_timestamp(&changes.edit_date),
                        id,
                    ],
                )?;

                Self::get_sync(conn, &id)
            })
            .await?)
    }

    async fn delete_by_id(&self, id: &EntryId) -> Result<Option<TranslationEntry>, StoreError> {
        self.ensure_open()?;
        let id = id.to_string();

        Ok(self
            .db
            .execute_async(move |conn| {
                let Some(stored) = Self::get_sync(conn, &id)? else {
                    return Ok(None);
                };
                conn.execute("DELETE FROM translations WHERE id = ?1", [&id])?;
                Ok(Some(stored))
            })
            .await?)
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(self.db.close_async().await?)
    }
}
