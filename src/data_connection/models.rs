/*!
 * Translation entry models and request payloads.
 *
 * `TranslationEntry` is what the store persists and what the HTTP layer
 * returns. `EntryPayload` is the lenient shape clients submit, and
 * `BatchInput` is the tagged form a request body is parsed into once, at
 * the boundary.
 */

use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque identity of a persisted entry, assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Wrap an existing identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identity for a new record
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source-language side of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Full source text
    pub main: String,

    /// Optional abbreviated source text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
}

/// A persisted translation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    /// Store-assigned identity
    #[serde(rename = "_id")]
    pub id: EntryId,

    /// Source text
    pub origin: Origin,

    /// Short classification tag
    #[serde(rename = "type")]
    pub kind: String,

    /// Target-language text
    pub translation: String,

    /// Time of first persistence
    pub creation_date: DateTime<Utc>,

    /// Time of the most recent persistence
    pub edit_date: DateTime<Utc>,
}

/// A date as clients send it: RFC 3339 text or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// RFC 3339 timestamp
    Text(String),
}

impl DateInput {
    /// Parse into a UTC timestamp, `None` if the value is not a valid date
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            DateInput::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            DateInput::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Text(value.to_rfc3339())
    }
}

/// Origin fields as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
}

/// An entry-like object as submitted by a client
///
/// Every field is optional: whether the payload describes a new entry or an
/// existing one is decided by the presence of `_id` (or its alternate
/// spelling `id`), and required-field validation is left to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    /// Primary identity field
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub primary_id: Option<Value>,

    /// Alternate identity field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<OriginPayload>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateInput>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<DateInput>,
}

impl EntryPayload {
    /// Identity of the payload, checking `_id` before `id`
    ///
    /// Strings and numbers are accepted as identities; `null`, empty strings
    /// and any other JSON type count as absent.
    pub fn identity(&self) -> Option<EntryId> {
        self.primary_id
            .as_ref()
            .and_then(identity_from_value)
            .or_else(|| self.id.as_ref().and_then(identity_from_value))
    }

    /// Parse a single JSON value field by field
    ///
    /// Values that are not objects become an empty payload. Inside an
    /// object, identity fields are kept as raw values and every other field
    /// is decoded on its own: a mistyped field is dropped with a warning
    /// while the identity and the well-typed fields survive.
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                warn!("Ignoring translation payload that is not an object: {}", other);
                return Self::default();
            }
        };

        Self {
            primary_id: fields.remove("_id"),
            id: fields.remove("id"),
            origin: take_field(&mut fields, "origin"),
            kind: take_field(&mut fields, "type"),
            translation: take_field(&mut fields, "translation"),
            creation_date: take_field(&mut fields, "creationDate"),
            edit_date: take_field(&mut fields, "editDate"),
        }
    }
}

fn take_field<T: DeserializeOwned>(fields: &mut Map<String, Value>, name: &str) -> Option<T> {
    let raw = fields.remove(name)?;
    match serde_json::from_value::<Option<T>>(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Dropping mistyped translation field '{}': {}", name, e);
            None
        }
    }
}

fn identity_from_value(value: &Value) -> Option<EntryId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(EntryId::new(s.trim())),
        Value::Number(n) => Some(EntryId::new(n.to_string())),
        _ => None,
    }
}

impl From<TranslationEntry> for EntryPayload {
    fn from(entry: TranslationEntry) -> Self {
        Self {
            primary_id: Some(Value::String(entry.id.to_string())),
            id: None,
            origin: Some(OriginPayload {
                main: Some(entry.origin.main),
                short: entry.origin.short,
            }),
            kind: Some(entry.kind),
            translation: Some(entry.translation),
            creation_date: Some(entry.creation_date.into()),
            edit_date: Some(entry.edit_date.into()),
        }
    }
}

/// A request body decoded once into its shape
#[derive(Debug, Clone, PartialEq)]
pub enum BatchInput {
    /// A single entry-like object
    Single(EntryPayload),
    /// A sequence of entry-like objects
    Many(Vec<EntryPayload>),
    /// Anything else: scalars, `null`, or a missing body
    Invalid,
}

impl BatchInput {
    /// Decode an arbitrary JSON value
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                BatchInput::Many(items.into_iter().map(EntryPayload::from_value).collect())
            }
            object @ Value::Object(_) => BatchInput::Single(EntryPayload::from_value(object)),
            _ => BatchInput::Invalid,
        }
    }

    /// Decode an optional JSON value, treating absence as invalid
    pub fn from_optional(value: Option<Value>) -> Self {
        value.map_or(BatchInput::Invalid, Self::from_value)
    }

    /// Short name of the shape, for log messages
    pub fn shape(&self) -> &'static str {
        match self {
            BatchInput::Single(_) => "single",
            BatchInput::Many(_) => "many",
            BatchInput::Invalid => "invalid",
        }
    }
}

impl From<Vec<EntryPayload>> for BatchInput {
    fn from(items: Vec<EntryPayload>) -> Self {
        BatchInput::Many(items)
    }
}

impl From<EntryPayload> for BatchInput {
    fn from(item: EntryPayload) -> Self {
        BatchInput::Single(item)
    }
}

/// A not-yet-persisted entry, stamped and ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewTranslation {
    pub origin: Option<OriginPayload>,
    pub kind: Option<String>,
    pub translation: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl NewTranslation {
    /// Build from a client payload, stamping both dates with `now`
    pub fn from_payload(payload: EntryPayload, now: DateTime<Utc>) -> Self {
        Self {
            origin: payload.origin,
            kind: payload.kind,
            translation: payload.translation,
            creation_date: now,
            edit_date: now,
        }
    }
}

/// Field changes for an existing entry
///
/// `None` leaves the stored value untouched. A submitted `creation_date`
/// never replaces the stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    pub origin: Option<OriginPayload>,
    pub kind: Option<String>,
    pub translation: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub edit_date: DateTime<Utc>,
}

/// An update routed to a specific stored entry
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub id: EntryId,
    pub changes: EntryUpdate,
}
