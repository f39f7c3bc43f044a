//! Cascade planner / deletion guard.
//!
//! Policy: required inbound references block the delete; optional single
//! references are cleared; set memberships are pruned, unless pruning
//! would empty a set the schema requires non-empty, which blocks instead.
//! The plan is one atomic batch: dependent mutations, then the delete.

use crate::domain::schema::{Constraint, SchemaRegistry};
use crate::domain::{DomainError, EntityKind, Id, Record, Value};
use crate::ports::{DocumentStore, WriteBatch, WriteOp};
use std::sync::Arc;
use tracing::debug;

pub struct DeletionPlanner {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn DocumentStore>,
}

impl DeletionPlanner {
    pub fn new(registry: Arc<SchemaRegistry>, store: Arc<dyn DocumentStore>) -> Self {
        Self { registry, store }
    }

    /// Compute the dependent mutations needed before `id` can go, or the
    /// blocking set. Kinds are scanned in registry order, so the reported
    /// blocking kind is deterministic.
    pub async fn plan(&self, kind: EntityKind, id: &Id) -> Result<WriteBatch, DomainError> {
        if self.store.get(kind, id).await?.is_none() {
            return Err(DomainError::NotFound {
                kind,
                id: id.clone(),
            });
        }

        let mut batch = WriteBatch::new();

        for schema in self.registry.schemas() {
            let inbound: Vec<_> = schema
                .reference_fields()
                .filter(|f| f.ty.ref_target() == Some(kind))
                .collect();
            if inbound.is_empty() {
                continue;
            }

            let target = id.clone();
            let dependents = self
                .store
                .find(schema.kind, &move |record: &Record| {
                    references_id(record, &target)
                })
                .await?;

            let mut blocking_ids = Vec::new();
            for dep in dependents {
                let mut record = dep.record;
                let mut mutated = false;
                let mut blocked = false;

                // One document may reference the target through several
                // fields; resolve them all against a single copy.
                for field in &inbound {
                    match record.get(field.name) {
                        Some(Value::Ref(r)) if r == id => {
                            if field.required {
                                blocked = true;
                                break;
                            }
                            record.remove(field.name);
                            mutated = true;
                        }
                        Some(Value::RefSet(ids)) if ids.contains(id) => {
                            let pruned: Vec<Id> =
                                ids.iter().filter(|r| *r != id).cloned().collect();
                            if pruned.is_empty() && field.has(&Constraint::NonEmpty) {
                                blocked = true;
                                break;
                            }
                            record.insert(field.name.to_string(), Value::RefSet(pruned));
                            mutated = true;
                        }
                        _ => {}
                    }
                }

                if blocked {
                    blocking_ids.push(dep.id);
                } else if mutated {
                    batch.push(WriteOp::Put {
                        kind: schema.kind,
                        id: dep.id,
                        record,
                    });
                }
            }

            if !blocking_ids.is_empty() {
                debug!(kind = %kind, id = %id, blocking_kind = %schema.kind,
                       blocked_by = blocking_ids.len(), "delete blocked");
                return Err(DomainError::DeleteBlocked {
                    blocking_kind: schema.kind,
                    blocking_ids,
                });
            }
        }

        batch.push(WriteOp::Delete {
            kind,
            id: id.clone(),
        });
        Ok(batch)
    }
}

/// Does any field of the record hold this id, directly or inside a set?
fn references_id(record: &Record, id: &Id) -> bool {
    record.values().any(|v| match v {
        Value::Ref(r) => r == id,
        Value::RefSet(ids) => ids.contains(id),
        _ => false,
    })
}
