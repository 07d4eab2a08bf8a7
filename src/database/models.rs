/*!
 * Row mapping for the translations table.
 */

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

use crate::data_connection::models::{EntryId, NewTranslation, Origin, TranslationEntry};
use crate::errors::StoreError;

/// Columns selected for a full entry, in `entry_from_row` order
pub const ENTRY_COLUMNS: &str =
    "id, origin_main, origin_short, kind, translation, creation_date, edit_date";

/// Format a timestamp for storage
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Build an entry from a row selected with `ENTRY_COLUMNS`
pub fn entry_from_row(row: &Row) -> rusqlite::Result<TranslationEntry> {
    Ok(TranslationEntry {
        id: EntryId::new(row.get::<_, String>(0)?),
        origin: Origin {
            main: row.get(1)?,
            short: row.get(2)?,
        },
        kind: row.get(3)?,
        translation: row.get(4)?,
        creation_date: parse_timestamp(row, 5)?,
        edit_date: parse_timestamp(row, 6)?,
    })
}

/// Check that a required text field is present and not blank
pub fn require_text(field: &str, value: Option<String>) -> Result<String, StoreError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(StoreError::Validation(format!("`{}` is required", field))),
    }
}

/// Reject a changed field that would blank out a required column
pub fn reject_blank(field: &str, value: &Option<String>) -> Result<(), StoreError> {
    match value {
        Some(text) if text.trim().is_empty() => Err(StoreError::Validation(format!(
            "`{}` cannot be empty",
            field
        ))),
        _ => Ok(()),
    }
}

/// Validate a new entry and give it an identity
pub fn entry_from_new(new: NewTranslation, id: EntryId) -> Result<TranslationEntry, StoreError> {
    let origin = new.origin.unwrap_or_default();
    Ok(TranslationEntry {
        id,
        origin: Origin {
            main: require_text("origin.main", origin.main)?,
            short: origin.short,
        },
        kind: require_text("type", new.kind)?,
        translation: require_text("translation", new.translation)?,
        creation_date: new.creation_date,
        edit_date: new.edit_date,
    })
}
