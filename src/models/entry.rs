use rust_decimal::Decimal;
use std::str::FromStr;

use super::field;
use crate::error::{StoreError, ValidationError};
use crate::store::{Collection, Document, Fields, Value};

/// The two kinds of line entry. They differ only in where they are stored
/// and what their fields are called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Item,
    Cost,
}

impl EntryKind {
    pub fn all() -> &'static [EntryKind] {
        &[Self::Item, Self::Cost]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "Item",
            Self::Cost => "Cost",
        }
    }

    pub(crate) fn collection(&self) -> Collection {
        match self {
            Self::Item => Collection::Items,
            Self::Cost => Collection::Costs,
        }
    }

    pub fn label_field(&self) -> &'static str {
        match self {
            Self::Item => field::NAME,
            Self::Cost => field::DESCRIPTION,
        }
    }

    pub fn magnitude_field(&self) -> &'static str {
        match self {
            Self::Item => field::COST,
            Self::Cost => field::AMOUNT,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub kind: EntryKind,
    /// Item name or cost description.
    pub label: String,
    pub magnitude: Decimal,
    pub project_id: String,
}

impl Entry {
    pub(crate) fn from_document(kind: EntryKind, doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            id: doc.id.clone(),
            kind,
            label: doc.text(kind.label_field())?.to_string(),
            magnitude: doc.number(kind.magnitude_field())?,
            project_id: doc.text(field::PROJECT_ID)?.to_string(),
        })
    }
}

/// User input for an entry, checked before anything is sent to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub label: String,
    pub magnitude: Decimal,
}

impl EntryDraft {
    pub fn parse(kind: EntryKind, label: &str, magnitude: &str) -> Result<Self, ValidationError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyField(kind.label_field()));
        }
        Ok(Self {
            label: label.to_string(),
            magnitude: parse_magnitude(magnitude)?,
        })
    }

    pub(crate) fn into_fields(self, kind: EntryKind) -> Fields {
        let mut fields = Fields::new();
        fields.insert(kind.label_field().into(), Value::Text(self.label));
        fields.insert(kind.magnitude_field().into(), Value::Number(self.magnitude));
        fields
    }
}

/// Non-negative real number. Scientific notation is accepted.
fn parse_magnitude(raw: &str) -> Result<Decimal, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyField("amount"));
    }
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ValidationError::InvalidAmount(raw.to_string()))?;
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(raw.to_string()));
    }
    Ok(value)
}
