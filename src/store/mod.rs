//! Document store collaborator.
//!
//! Every persistent record is a flat document: a map of field names to
//! scalar values, kept in one of a few named collections. The session layer
//! talks to the store only through [`DocumentStore`].

#[cfg(test)]
mod memory;
mod sqlite;

#[cfg(test)]
pub(crate) use memory::MemoryStore;
pub(crate) use sqlite::SqliteStore;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::StoreError;

pub(crate) type DocumentId = String;
pub(crate) type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Collection {
    Projects,
    Items,
    Costs,
}

impl Collection {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Items => "items",
            Self::Costs => "costs",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Text(String),
    Number(Decimal),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Canonical string form. Equal values always encode identically, so
    /// encoded values can be compared for equality filters.
    pub(crate) fn encode(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(d) => d.normalize().to_string(),
            Self::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    pub(crate) fn decode(kind: &str, raw: &str) -> Option<Self> {
        match kind {
            "text" => Some(Self::Text(raw.to_string())),
            "number" => Decimal::from_str(raw).ok().map(Self::Number),
            "timestamp" => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| Self::Timestamp(ts.with_timezone(&Utc))),
            _ => None,
        }
    }

    /// Values of different kinds are unordered.
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Number(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document {
    pub(crate) id: DocumentId,
    pub(crate) fields: Fields,
}

impl Document {
    fn field(&self, name: &str) -> Result<&Value, StoreError> {
        self.fields.get(name).ok_or_else(|| self.corrupt(format!("missing field '{name}'")))
    }

    pub(crate) fn text(&self, name: &str) -> Result<&str, StoreError> {
        match self.field(name)? {
            Value::Text(s) => Ok(s),
            other => Err(self.corrupt(format!("field '{name}' is {}, expected text", other.kind()))),
        }
    }

    pub(crate) fn number(&self, name: &str) -> Result<Decimal, StoreError> {
        match self.field(name)? {
            Value::Number(d) => Ok(*d),
            other => Err(self.corrupt(format!("field '{name}' is {}, expected number", other.kind()))),
        }
    }

    pub(crate) fn timestamp(&self, name: &str) -> Result<DateTime<Utc>, StoreError> {
        match self.field(name)? {
            Value::Timestamp(ts) => Ok(*ts),
            other => Err(self.corrupt(format!(
                "field '{name}' is {}, expected timestamp",
                other.kind()
            ))),
        }
    }

    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::Corrupt {
            id: self.id.clone(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Ascending,
    Descending,
}

/// Equality filter on at most one field plus optional ordering.
#[derive(Debug, Clone, Default)]
pub(crate) struct Query {
    pub(crate) filter: Option<(String, Value)>,
    pub(crate) order: Option<(String, Direction)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter = Some((field.to_string(), value.into()));
        self
    }

    pub(crate) fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some((field.to_string(), direction));
        self
    }

    /// Apply the ordering clause. Documents without the ordering field are
    /// dropped from an ordered result.
    pub(crate) fn sort(&self, docs: &mut Vec<Document>) {
        let Some((field, direction)) = &self.order else {
            return;
        };
        docs.retain(|d| d.fields.contains_key(field));
        docs.sort_by(|a, b| {
            let ord = match (a.fields.get(field), b.fields.get(field)) {
                (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            match direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
    }
}

pub(crate) trait DocumentStore {
    /// Insert a new document; the store assigns its id.
    fn add(&mut self, collection: Collection, fields: Fields) -> Result<DocumentId, StoreError>;

    /// Merge `fields` into an existing document.
    fn update(&mut self, collection: Collection, id: &str, fields: Fields)
        -> Result<(), StoreError>;

    /// Remove a document. Removing a missing id is not an error.
    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError>;

    fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError>;
}

pub(crate) fn new_document_id() -> DocumentId {
    uuid::Uuid::new_v4().simple().to_string()
}
