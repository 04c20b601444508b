use chrono::{SubsecRound, Utc};

use crate::error::{SessionError, StoreError};
use crate::models::{field, Entry, EntryDraft, EntryKind};
use crate::store::{DocumentStore, Query, Value};

/// Entries of one kind for one project. The local copy only changes after
/// the store call it mirrors has succeeded.
#[derive(Debug)]
pub(crate) struct EntryRegistry {
    kind: EntryKind,
    entries: Vec<Entry>,
}

impl EntryRegistry {
    pub(crate) fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Fails unless `id` is one of the loaded entries.
    pub(crate) fn require(&self, id: &str) -> Result<(), SessionError> {
        if self.entries.iter().any(|e| e.id == id) {
            return Ok(());
        }
        Err(SessionError::UnknownEntry {
            kind: self.kind,
            id: id.to_string(),
        })
    }

    pub(crate) fn list(&mut self, store: &impl DocumentStore, project_id: &str) -> Result<(), StoreError> {
        let query = Query::new().where_eq(field::PROJECT_ID, project_id);
        self.entries = store
            .query(self.kind.collection(), &query)?
            .iter()
            .map(|doc| Entry::from_document(self.kind, doc))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    pub(crate) fn add(
        &mut self,
        store: &mut impl DocumentStore,
        project_id: &str,
        owner_id: &str,
        draft: EntryDraft,
    ) -> Result<Entry, StoreError> {
        let mut fields = draft.clone().into_fields(self.kind);
        fields.insert(field::PROJECT_ID.into(), Value::from(project_id));
        fields.insert(field::USER_ID.into(), Value::from(owner_id));
        fields.insert(field::CREATED_AT.into(), Value::from(Utc::now().trunc_subsecs(6)));
        let id = store.add(self.kind.collection(), fields)?;

        let entry = Entry {
            id,
            kind: self.kind,
            label: draft.label,
            magnitude: draft.magnitude,
            project_id: project_id.to_string(),
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub(crate) fn update(
        &mut self,
        store: &mut impl DocumentStore,
        id: &str,
        draft: EntryDraft,
    ) -> Result<(), StoreError> {
        let mut fields = draft.clone().into_fields(self.kind);
        fields.insert(field::UPDATED_AT.into(), Value::from(Utc::now().trunc_subsecs(6)));
        store.update(self.kind.collection(), id, fields)?;

        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.label = draft.label;
            entry.magnitude = draft.magnitude;
        }
        Ok(())
    }

    pub(crate) fn remove(&mut self, store: &mut impl DocumentStore, id: &str) -> Result<(), StoreError> {
        store.delete(self.kind.collection(), id)?;
        self.entries.retain(|e| e.id != id);
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
