//! Admin service: the one write path.
//!
//! Every create/update/delete runs validate -> check references -> plan ->
//! atomic commit, as a single guarded batch against the store, under a
//! caller-configured timeout.

use crate::domain::schema::{Constraint, EntitySchema, SchemaRegistry};
use crate::domain::validate::validate;
use crate::domain::{DomainError, Document, EntityKind, Id, KindDescriptor, Record, Value};
use crate::ports::{AdminPort, DocumentStore, WriteBatch, WriteGuard, WriteOp};
use crate::usecases::{DeletionPlanner, ReferenceChecker};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Coordinates the guarded CRUD pipeline. Implements the console-facing
/// `AdminPort`.
pub struct AdminService {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn DocumentStore>,
    checker: ReferenceChecker,
    planner: DeletionPlanner,
    op_timeout: Duration,
}

impl AdminService {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn DocumentStore>,
        op_timeout: Duration,
    ) -> Self {
        let checker = ReferenceChecker::new(Arc::clone(&registry), Arc::clone(&store));
        let planner = DeletionPlanner::new(Arc::clone(&registry), Arc::clone(&store));
        Self {
            registry,
            store,
            checker,
            planner,
            op_timeout,
        }
    }

    /// Commit a batch through the store, bounding it by the operation
    /// timeout. On expiry the store's own rollback owns cleanup.
    async fn commit(&self, batch: WriteBatch) -> Result<(), DomainError> {
        let millis = self.op_timeout.as_millis() as u64;
        tokio::time::timeout(self.op_timeout, self.store.apply(batch))
            .await
            .map_err(|_| DomainError::OperationTimedOut(millis))?
    }

    /// Guards re-evaluated by the store at commit: every reference target
    /// must still exist, every unique field value must still be free.
    fn commit_guards(
        schema: &EntitySchema,
        record: &Record,
        exclude: Option<&Id>,
        batch: &mut WriteBatch,
    ) {
        for field in &schema.fields {
            let value = match record.get(field.name) {
                Some(v) => v,
                None => continue,
            };
            if let Some(target) = field.ty.ref_target() {
                match value {
                    Value::Ref(id) => batch.guard(WriteGuard::Exists {
                        field: field.name.to_string(),
                        kind: target,
                        id: id.clone(),
                    }),
                    Value::RefSet(ids) => {
                        for id in ids {
                            batch.guard(WriteGuard::Exists {
                                field: field.name.to_string(),
                                kind: target,
                                id: id.clone(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            if field.has(&Constraint::Unique) {
                batch.guard(WriteGuard::UniqueValue {
                    kind: schema.kind,
                    field: field.name.to_string(),
                    value: value.clone(),
                    exclude: exclude.cloned(),
                });
            }
        }
    }
}

#[async_trait::async_trait]
impl AdminPort for AdminService {
    fn kinds(&self) -> &[KindDescriptor] {
        self.registry.kinds()
    }

    fn schema(&self, kind: EntityKind) -> Result<&EntitySchema, DomainError> {
        self.registry.schema(kind)
    }

    async fn create(&self, kind: EntityKind, record: Record) -> Result<Id, DomainError> {
        let schema = self.registry.schema(kind)?;
        validate(schema, &record).map_err(|errors| DomainError::validation(kind, errors))?;
        self.checker.check(kind, &record).await?;

        let id = Id::generate();
        let mut batch = WriteBatch::new();
        Self::commit_guards(schema, &record, None, &mut batch);
        batch.push(WriteOp::Put {
            kind,
            id: id.clone(),
            record,
        });
        self.commit(batch).await?;

        info!(kind = %kind, id = %id, "document created");
        Ok(id)
    }

    async fn update(&self, kind: EntityKind, id: &Id, patch: Record) -> Result<(), DomainError> {
        let schema = self.registry.schema(kind)?;
        let mut merged = self
            .store
            .get(kind, id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                kind,
                id: id.clone(),
            })?;
        for (name, value) in patch {
            merged.insert(name, value);
        }

        validate(schema, &merged).map_err(|errors| DomainError::validation(kind, errors))?;
        self.checker.check(kind, &merged).await?;

        let mut batch = WriteBatch::new();
        Self::commit_guards(schema, &merged, Some(id), &mut batch);
        batch.push(WriteOp::Put {
            kind,
            id: id.clone(),
            record: merged,
        });
        self.commit(batch).await?;

        info!(kind = %kind, id = %id, "document updated");
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &Id) -> Result<(), DomainError> {
        let batch = self.planner.plan(kind, id).await?;
        let dependents = batch.ops.len().saturating_sub(1);
        self.commit(batch).await?;

        info!(kind = %kind, id = %id, dependents, "document deleted");
        Ok(())
    }

    async fn get(&self, kind: EntityKind, id: &Id) -> Result<Document, DomainError> {
        // Kind must be registered even for reads; misconfiguration is fatal
        // upstream, not a silent empty result.
        self.registry.schema(kind)?;
        let record = self
            .store
            .get(kind, id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                kind,
                id: id.clone(),
            })?;
        Ok(Document {
            id: id.clone(),
            record,
        })
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>, DomainError> {
        self.registry.schema(kind)?;
        self.store.find(kind, &|_| true).await
    }
}
