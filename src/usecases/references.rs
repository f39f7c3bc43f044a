//! Referential-integrity checker.
//!
//! Every entry point goes through this one component so every write gets
//! identical guarantees. Cheap checks (empty required sets) run before any
//! store lookup; set elements resolve in index order and the first missing
//! element wins, so the reported error is deterministic.

use crate::domain::schema::{Constraint, FieldType, SchemaRegistry};
use crate::domain::{DomainError, EntityKind, Id, Record, Value};
use crate::ports::DocumentStore;
use std::sync::Arc;
use tracing::debug;

/// Resolves every reference field of a candidate record against the store.
pub struct ReferenceChecker {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn DocumentStore>,
}

impl ReferenceChecker {
    pub fn new(registry: Arc<SchemaRegistry>, store: Arc<dyn DocumentStore>) -> Self {
        Self { registry, store }
    }

    /// Confirm each reference target exists and declared cross-record
    /// consistency rules hold.
    pub async fn check(&self, kind: EntityKind, record: &Record) -> Result<(), DomainError> {
        let schema = self.registry.schema(kind)?;

        // Pass 1: required-set emptiness, no lookups yet.
        for field in schema.reference_fields() {
            if !field.has(&Constraint::NonEmpty) {
                continue;
            }
            if let Some(Value::RefSet(ids)) = record.get(field.name) {
                if ids.is_empty() {
                    return Err(DomainError::constraint(
                        field.name,
                        "must reference at least one document",
                    ));
                }
            }
        }

        // Pass 2: existence lookups.
        for field in schema.reference_fields() {
            let target = match field.ty {
                FieldType::Ref(t) | FieldType::RefSet(t) => t,
                _ => continue,
            };
            match record.get(field.name) {
                Some(Value::Ref(id)) => {
                    self.resolve(field.name, target, id).await?;
                }
                Some(Value::RefSet(ids)) => {
                    // Index order; abort on the first missing element.
                    for id in ids {
                        self.resolve(field.name, target, id).await?;
                    }
                }
                _ => {}
            }
        }

        // Pass 3: cross-record consistency (needs the referenced document).
        for m in &schema.ref_matches {
            let (local_id, via_id) = match (record.get(m.local_field), record.get(m.via)) {
                (Some(Value::Ref(l)), Some(Value::Ref(v))) => (l, v),
                _ => continue,
            };
            let via_kind = schema
                .field(m.via)
                .and_then(|f| f.ty.ref_target())
                .ok_or_else(|| {
                    DomainError::Store(format!("ref match via non-reference field '{}'", m.via))
                })?;
            let via_record = self.resolve(m.via, via_kind, via_id).await?;
            match via_record.get(m.remote_field) {
                Some(Value::Ref(remote_id)) if remote_id == local_id => {}
                _ => {
                    return Err(DomainError::constraint(
                        m.local_field,
                        format!("must match '{}' of the referenced {via_kind}", m.remote_field),
                    ));
                }
            }
        }

        Ok(())
    }

    async fn resolve(
        &self,
        field: &str,
        target: EntityKind,
        id: &Id,
    ) -> Result<Record, DomainError> {
        match self.store.get(target, id).await? {
            Some(record) => Ok(record),
            None => {
                debug!(field, target = %target, id = %id, "dangling reference");
                Err(DomainError::DanglingReference {
                    field: field.to_string(),
                    target_kind: target,
                    target_id: id.clone(),
                })
            }
        }
    }
}
