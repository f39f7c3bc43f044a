//! JSON-file `DocumentStore`. One file per collection under a data
//! directory: data/{kind}.json.
//!
//! The working copy lives in an in-memory cache guarded by a `RwLock`;
//! `apply` mutates the cache under the write lock and then persists each
//! touched collection with the write-replace pattern:
//! 1. write to a temp file
//! 2. sync_all() to flush
//! 3. atomic rename over the target
//! A crash between commit and rename leaves the file one batch behind;
//! `load()` is the recovery point.

use super::{Collections, apply_batch};
use crate::domain::{DomainError, Document, EntityKind, Id, Record};
use crate::ports::{DocumentStore, WriteBatch};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::info;

pub struct JsonStore {
    base_dir: PathBuf,
    cache: RwLock<Collections>,
}

impl JsonStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            cache: RwLock::new(Collections::new()),
        }
    }

    fn collection_path(&self, kind: EntityKind) -> PathBuf {
        self.base_dir.join(format!("{}.json", kind.collection()))
    }

    /// Load every collection file found under the data directory into the
    /// cache. Call after construction.
    pub async fn load(&self, kinds: &[EntityKind]) -> Result<(), DomainError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| DomainError::Store(format!("create data dir: {e}")))?;

        let mut cache = self.cache.write().await;
        cache.clear();
        for &kind in kinds {
            let path = self.collection_path(kind);
            let docs: BTreeMap<Id, Record> = match fs::read_to_string(&path).await {
                Ok(s) => serde_json::from_str(&s)
                    .map_err(|e| DomainError::Store(format!("parse {}: {e}", path.display())))?,
                Err(_) => BTreeMap::new(),
            };
            if !docs.is_empty() {
                info!(kind = %kind, count = docs.len(), "loaded collection");
            }
            cache.insert(kind, docs);
        }
        Ok(())
    }

    async fn persist(&self, kind: EntityKind, docs: &BTreeMap<Id, Record>) -> Result<(), DomainError> {
        let path = self.collection_path(kind);
        let json = serde_json::to_string_pretty(docs)
            .map_err(|e| DomainError::Store(format!("serialize {kind}: {e}")))?;

        let temp_path = path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Store(format!("create temp file: {e}")))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Store(format!("write temp file: {e}")))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Store(format!("sync temp file: {e}")))?;
        drop(f);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| DomainError::Store(format!("atomic rename failed: {e}")))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for JsonStore {
    async fn get(&self, kind: EntityKind, id: &Id) -> Result<Option<Record>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.get(&kind).and_then(|c| c.get(id)).cloned())
    }

    async fn find(
        &self,
        kind: EntityKind,
        predicate: &(dyn for<'a> Fn(&'a Record) -> bool + Sync),
    ) -> Result<Vec<Document>, DomainError> {
        let cache = self.cache.read().await;
        let docs = cache
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
        let mut cache = self.cache.write().await;
        let touched = apply_batch(&mut cache, batch)?;
        for kind in touched {
            let docs = cache.get(&kind).cloned().unwrap_or_default();
            self.persist(kind, &docs).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::ports::WriteOp;

    #[tokio::test]
    async fn test_batch_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store.load(&[EntityKind::StockItem]).await.unwrap();

        let id = Id::generate();
        let mut record = Record::new();
        record.insert("name".into(), Value::Str("Malt".into()));
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Put {
            kind: EntityKind::StockItem,
            id: id.clone(),
            record: record.clone(),
        });
        store.apply(batch).await.unwrap();

        let reopened = JsonStore::new(dir.path());
        reopened.load(&[EntityKind::StockItem]).await.unwrap();
        let loaded = reopened.get(EntityKind::StockItem, &id).await.unwrap();
        assert_eq!(loaded, Some(record));
    }
}
