//! In-memory `DocumentStore`. Backs tests and embedded single-process use.
//!
//! One `RwLock` over all collections: reads share, `apply` takes the write
//! lock so batches serialize and commit all-or-nothing.

use super::{Collections, apply_batch};
use crate::domain::{DomainError, Document, EntityKind, Id, Record};
use crate::ports::{DocumentStore, WriteBatch};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, kind: EntityKind, id: &Id) -> Result<Option<Record>, DomainError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&kind).and_then(|c| c.get(id)).cloned())
    }

    async fn find(
        &self,
        kind: EntityKind,
        predicate: &(dyn for<'a> Fn(&'a Record) -> bool + Sync),
    ) -> Result<Vec<Document>, DomainError> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(&kind)
            .map(|c| {
                c.iter()
                    .filter(|(_, record)| predicate(record))
                    .map(|(id, record)| Document {
                        id: id.clone(),
                        record: record.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), DomainError> {
        let mut collections = self.collections.write().await;
        apply_batch(&mut collections, batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::ports::{WriteGuard, WriteOp};

    fn record(name: &str) -> Record {
        let mut r = Record::new();
        r.insert("name".into(), Value::Str(name.into()));
        r
    }

    #[tokio::test]
    async fn test_failed_guard_leaves_store_untouched() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.guard(WriteGuard::Exists {
            field: "role".into(),
            kind: EntityKind::Role,
            id: Id::generate(),
        });
        batch.push(WriteOp::Put {
            kind: EntityKind::Employee,
            id: Id::generate(),
            record: record("Ana"),
        });

        assert!(matches!(
            store.apply(batch).await.unwrap_err(),
            DomainError::DanglingReference { .. }
        ));
        let all = store.find(EntityKind::Employee, &|_| true).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_unique_guard_rejects_duplicate_value() {
        let store = MemoryStore::new();
        let first = Id::generate();
        let mut seed = WriteBatch::new();
        let mut rec = record("Filler A");
        rec.insert("inventory_number".into(), Value::Int(7));
        seed.push(WriteOp::Put {
            kind: EntityKind::Machine,
            id: first.clone(),
            record: rec.clone(),
        });
        store.apply(seed).await.unwrap();

        let mut dup = WriteBatch::new();
        dup.guard(WriteGuard::UniqueValue {
            kind: EntityKind::Machine,
            field: "inventory_number".into(),
            value: Value::Int(7),
            exclude: None,
        });
        dup.push(WriteOp::Put {
            kind: EntityKind::Machine,
            id: Id::generate(),
            record: rec.clone(),
        });
        assert!(matches!(
            store.apply(dup).await.unwrap_err(),
            DomainError::Constraint { .. }
        ));

        // Updating the holder itself passes via exclude.
        let mut own = WriteBatch::new();
        own.guard(WriteGuard::UniqueValue {
            kind: EntityKind::Machine,
            field: "inventory_number".into(),
            value: Value::Int(7),
            exclude: Some(first.clone()),
        });
        own.push(WriteOp::Put {
            kind: EntityKind::Machine,
            id: first,
            record: rec,
        });
        store.apply(own).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_of_absent_id_fails() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Delete {
            kind: EntityKind::Sector,
            id: Id::generate(),
        });
        assert!(matches!(
            store.apply(batch).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
