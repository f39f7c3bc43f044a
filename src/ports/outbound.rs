//! Outbound port. Application calls into the document store.
//!
//! Implemented by persistence adapters. The store knows nothing about
//! schemas; guards carry exactly the conditions it must re-evaluate
//! atomically at commit time.

use crate::domain::{DomainError, Document, EntityKind, Id, Record, Value};

/// A single write against one collection.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert or replace the document with this id.
    Put {
        kind: EntityKind,
        id: Id,
        record: Record,
    },
    /// Remove the document with this id. Removing an absent id is an error
    /// (the batch was planned against stale state).
    Delete { kind: EntityKind, id: Id },
}

/// Commit-time condition. Evaluated by the store under its write lock,
/// immediately before the batch applies; any failure aborts the whole
/// batch with the guard's violation.
#[derive(Debug, Clone)]
pub enum WriteGuard {
    /// A referenced document must still exist. Closes the race between
    /// reference checking and commit.
    Exists {
        field: String,
        kind: EntityKind,
        id: Id,
    },
    /// No other document of the kind may hold this value in this field.
    /// `exclude` skips the document being updated.
    UniqueValue {
        kind: EntityKind,
        field: String,
        value: Value,
        exclude: Option<Id>,
    },
}

impl WriteGuard {
    /// The domain error the store returns when this guard fails.
    #[must_use]
    pub fn violation(&self) -> DomainError {
        match self {
            Self::Exists { field, kind, id } => DomainError::DanglingReference {
                field: field.clone(),
                target_kind: *kind,
                target_id: id.clone(),
            },
            Self::UniqueValue { field, .. } => DomainError::Constraint {
                field: field.clone(),
                reason: "value already in use".to_string(),
            },
        }
    }
}

/// All-or-nothing unit of work: guards first, then ops in order.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub guards: Vec<WriteGuard>,
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard(&mut self, guard: WriteGuard) {
        self.guards.push(guard);
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty() && self.ops.is_empty()
    }
}

/// Document store port. One collection per entity kind; the store assigns
/// no ids and enforces no schema — it only guarantees atomicity of
/// `apply` and read-committed visibility of `get`/`find`.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, or None if absent.
    async fn get(&self, kind: EntityKind, id: &Id) -> Result<Option<Record>, DomainError>;

    /// Scan a collection, returning documents matching the predicate.
    /// Finite; restarted from the beginning on every call.
    async fn find(
        &self,
        kind: EntityKind,
        predicate: &(dyn for<'a> Fn(&'a Record) -> bool + Sync),
    ) -> Result<Vec<Document>, DomainError>;

    /// Atomically evaluate all guards, then apply all ops, all-or-nothing.
    /// Concurrent `apply` calls serialize against each other.
    async fn apply(&self, batch: WriteBatch) -> Result<(), DomainError>;
}
