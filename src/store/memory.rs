use std::cell::Cell;
use std::collections::BTreeMap;

use super::{new_document_id, Collection, Document, DocumentId, DocumentStore, Fields, Query};
use crate::error::StoreError;

/// In-process store for tests. `fail_next` makes the next call fail the way
/// an unreachable backend would.
#[derive(Default)]
pub(crate) struct MemoryStore {
    docs: BTreeMap<(Collection, u64), Document>,
    seq: u64,
    failure: Cell<Option<String>>,
    calls: Cell<usize>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_next(&self, message: &str) {
        self.failure.set(Some(message.to_string()));
    }

    /// Number of store calls made so far, failed ones included.
    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn len(&self, collection: Collection) -> usize {
        self.docs.keys().filter(|(c, _)| *c == collection).count()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.set(self.calls.get() + 1);
        match self.failure.take() {
            Some(message) => Err(StoreError::Unavailable(message)),
            None => Ok(()),
        }
    }

    fn key_of(&self, collection: Collection, id: &str) -> Option<(Collection, u64)> {
        self.docs
            .iter()
            .find(|((c, _), doc)| *c == collection && doc.id == id)
            .map(|(key, _)| *key)
    }
}

impl DocumentStore for MemoryStore {
    fn add(&mut self, collection: Collection, fields: Fields) -> Result<DocumentId, StoreError> {
        self.enter()?;
        let id = new_document_id();
        self.seq += 1;
        self.docs.insert(
            (collection, self.seq),
            Document {
                id: id.clone(),
                fields,
            },
        );
        Ok(id)
    }

    fn update(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.enter()?;
        let key = self.key_of(collection, id).ok_or_else(|| StoreError::NotFound {
            collection: collection.as_str(),
            id: id.to_string(),
        })?;
        if let Some(doc) = self.docs.get_mut(&key) {
            doc.fields.extend(fields);
        }
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.enter()?;
        if let Some(key) = self.key_of(collection, id) {
            self.docs.remove(&key);
        }
        Ok(())
    }

    fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.enter()?;
        let mut docs: Vec<Document> = self
            .docs
            .iter()
            .filter(|((c, _), doc)| *c == collection && matches(query, doc))
            .map(|(_, doc)| doc.clone())
            .collect();
        query.sort(&mut docs);
        Ok(docs)
    }
}

fn matches(query: &Query, doc: &Document) -> bool {
    match &query.filter {
        Some((field, expected)) => doc
            .fields
            .get(field)
            .is_some_and(|v| v.kind() == expected.kind() && v.encode() == expected.encode()),
        None => true,
    }
}
