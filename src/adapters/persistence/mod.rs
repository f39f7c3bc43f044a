//! Persistence adapters implementing the `DocumentStore` port.

pub mod json_store;
pub mod memory_store;

pub use json_store::JsonStore;
pub use memory_store::MemoryStore;

use crate::domain::{DomainError, EntityKind, Id, Record};
use crate::ports::{WriteBatch, WriteGuard, WriteOp};
use std::collections::{BTreeMap, BTreeSet};

pub(crate) type Collections = BTreeMap<EntityKind, BTreeMap<Id, Record>>;

/// Evaluate every guard, then apply every op, against in-memory
/// collections. Caller holds the store's write lock, which is what makes
/// the batch atomic and serializes concurrent `apply` calls. All checks
/// run before the first mutation, so a failed batch changes nothing.
/// Returns the kinds that were touched.
pub(crate) fn apply_batch(
    collections: &mut Collections,
    batch: WriteBatch,
) -> Result<BTreeSet<EntityKind>, DomainError> {
    for guard in &batch.guards {
        let ok = match guard {
            WriteGuard::Exists { kind, id, .. } => collections
                .get(kind)
                .is_some_and(|c| c.contains_key(id)),
            WriteGuard::UniqueValue {
                kind,
                field,
                value,
                exclude,
            } => !collections.get(kind).is_some_and(|c| {
                c.iter().any(|(doc_id, record)| {
                    exclude.as_ref() != Some(doc_id) && record.get(field.as_str()) == Some(value)
                })
            }),
        };
        if !ok {
            return Err(guard.violation());
        }
    }

    // Deleting an absent id means the batch was planned against stale
    // state; refuse before mutating anything.
    for op in &batch.ops {
        if let WriteOp::Delete { kind, id } = op {
            if !collections.get(kind).is_some_and(|c| c.contains_key(id)) {
                return Err(DomainError::NotFound {
                    kind: *kind,
                    id: id.clone(),
                });
            }
        }
    }

    let mut touched = BTreeSet::new();
    for op in batch.ops {
        match op {
            WriteOp::Put { kind, id, record } => {
                collections.entry(kind).or_default().insert(id, record);
                touched.insert(kind);
            }
            WriteOp::Delete { kind, id } => {
                if let Some(c) = collections.get_mut(&kind) {
                    c.remove(&id);
                }
                touched.insert(kind);
            }
        }
    }
    Ok(touched)
}
