use chrono::{DateTime, Local};

use super::field;
use crate::error::{StoreError, ValidationError};
use crate::store::{Document, Fields, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    /// Stored as a UTC timestamp, converted to local time on read.
    pub created_at: DateTime<Local>,
}

impl Project {
    pub(crate) fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            id: doc.id.clone(),
            name: doc.text(field::NAME)?.to_string(),
            description: doc.text(field::DESCRIPTION)?.to_string(),
            owner_id: doc.text(field::USER_ID)?.to_string(),
            created_at: doc.timestamp(field::CREATED_AT)?.with_timezone(&Local),
        })
    }

    /// Find a project by id, or by name (case-insensitive) when no id matches.
    pub fn find<'a>(projects: &'a [Project], key: &str) -> Option<&'a Project> {
        let lower = key.to_lowercase();
        projects
            .iter()
            .find(|p| p.id == key)
            .or_else(|| projects.iter().find(|p| p.name.to_lowercase() == lower))
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validated name/description pair for create and rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

impl ProjectDraft {
    pub fn parse(name: &str, description: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("project name"));
        }
        Ok(Self {
            name: name.to_string(),
            description: description.trim().to_string(),
        })
    }

    pub(crate) fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(field::NAME.into(), Value::Text(self.name));
        fields.insert(field::DESCRIPTION.into(), Value::Text(self.description));
        fields
    }
}
