use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

use super::{new_document_id, Collection, Document, DocumentId, DocumentStore, Fields, Query, Value};
use crate::error::StoreError;

pub(crate) struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn write_fields(tx: &rusqlite::Transaction<'_>, id: &str, fields: &Fields) -> Result<(), StoreError> {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO fields (doc_id, name, kind, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(doc_id, name) DO UPDATE SET kind = excluded.kind, value = excluded.value",
        )?;
        for (name, value) in fields {
            stmt.execute(params![id, name, value.kind(), value.encode()])?;
        }
        Ok(())
    }

    fn candidate_ids(&self, collection: Collection, query: &Query) -> Result<Vec<String>, StoreError> {
        let ids = match &query.filter {
            Some((field, value)) => {
                let mut stmt = self.conn.prepare(
                    "SELECT d.id FROM documents d
                     JOIN fields f ON f.doc_id = d.id
                     WHERE d.collection = ?1 AND f.name = ?2 AND f.kind = ?3 AND f.value = ?4
                     ORDER BY d.created_at, d.id",
                )?;
                let rows = stmt.query_map(
                    params![collection.as_str(), field, value.kind(), value.encode()],
                    |row| row.get(0),
                )?;
                rows.collect::<std::result::Result<Vec<String>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id FROM documents WHERE collection = ?1 ORDER BY created_at, id",
                )?;
                let rows = stmt.query_map(params![collection.as_str()], |row| row.get(0))?;
                rows.collect::<std::result::Result<Vec<String>, _>>()?
            }
        };
        Ok(ids)
    }

    fn load(&self, id: String) -> Result<Document, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name, kind, value FROM fields WHERE doc_id = ?1")?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut fields = BTreeMap::new();
        for row in rows {
            let (name, kind, raw) = row?;
            let value = Value::decode(&kind, &raw).ok_or_else(|| StoreError::Corrupt {
                id: id.clone(),
                reason: format!("field '{name}' has undecodable {kind} value '{raw}'"),
            })?;
            fields.insert(name, value);
        }
        Ok(Document { id, fields })
    }
}

impl DocumentStore for SqliteStore {
    fn add(&mut self, collection: Collection, fields: Fields) -> Result<DocumentId, StoreError> {
        let id = new_document_id();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO documents (id, collection, created_at) VALUES (?1, ?2, ?3)",
            params![
                id,
                collection.as_str(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
            ],
        )?;
        Self::write_fields(&tx, &id, &fields)?;
        tx.commit()?;
        log::debug!("event=doc_add collection={collection} id={id}");
        Ok(id)
    }

    fn update(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?1 AND collection = ?2)",
            params![id, collection.as_str()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            });
        }
        Self::write_fields(&tx, id, &fields)?;
        tx.commit()?;
        log::debug!("event=doc_update collection={collection} id={id}");
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE id = ?1 AND collection = ?2",
            params![id, collection.as_str()],
        )?;
        log::debug!("event=doc_delete collection={collection} id={id} removed={removed}");
        Ok(())
    }

    fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut docs = self
            .candidate_ids(collection, query)?
            .into_iter()
            .map(|id| self.load(id))
            .collect::<Result<Vec<_>, _>>()?;
        query.sort(&mut docs);
        Ok(docs)
    }
}
