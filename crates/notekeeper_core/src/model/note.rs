//! Note model as served by `GET /notes`.
//!
//! # Invariants
//! - `NoteCollection` keeps server order; the client never reorders it.
//! - `NoteCollection` is only ever replaced wholesale from a listing.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque server-assigned note identifier.
///
/// The wire form may be an integer or a string; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Int(i64),
            Text(String),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Int(value) => Self(value.to_string()),
            WireId::Text(value) => Self(value),
        })
    }
}

/// One stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Server-computed word count, when the server reports one.
    #[serde(default)]
    pub word_count: Option<u32>,
}

/// Authoritative, server-ordered listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCollection(Vec<Note>);

impl NoteCollection {
    pub fn new(notes: Vec<Note>) -> Self {
        Self(notes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.0.iter().any(|note| &note.id == id)
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.0.iter()
    }
}

impl From<Vec<Note>> for NoteCollection {
    fn from(value: Vec<Note>) -> Self {
        Self(value)
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO timestamps (read as UTC).
pub(crate) fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognized timestamp `{raw}`"))
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
