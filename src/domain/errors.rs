//! Domain errors. Used by ports and use cases.
//!
//! Recoverable failures are returned as structured values so the console
//! can render them as form/field-level messages; `SchemaConflict` and
//! `UnknownEntity` are programmer errors and abort startup instead.

use crate::domain::schema::EntityKind;
use crate::domain::value::Id;
use serde::Serialize;
use thiserror::Error;

/// One violated field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    /// The record violates its schema. Carries every violated field, not
    /// just the first, so a form can show all errors at once.
    #[error("validation of {kind} failed on {} field(s)", errors.len())]
    Validation {
        kind: EntityKind,
        errors: Vec<FieldError>,
    },

    /// A reference field points at a document that does not exist.
    #[error("field '{field}' references missing {target_kind} {target_id}")]
    DanglingReference {
        field: String,
        target_kind: EntityKind,
        target_id: Id,
    },

    /// A declared constraint failed outside plain field validation
    /// (empty required set, uniqueness, cross-record consistency).
    #[error("constraint violated on '{field}': {reason}")]
    Constraint { field: String, reason: String },

    /// Deletion refused: live required references point at the document.
    #[error("delete blocked by {} {blocking_kind} document(s)", blocking_ids.len())]
    DeleteBlocked {
        blocking_kind: EntityKind,
        blocking_ids: Vec<Id>,
    },

    /// Kind re-registered with a different shape. Misconfigured deployment.
    #[error("entity kind '{0}' already registered with a different shape")]
    SchemaConflict(EntityKind),

    /// Kind never registered. Misconfigured deployment.
    #[error("unknown entity kind '{0}'")]
    UnknownEntity(EntityKind),

    /// No document with this id in the kind's collection.
    #[error("no {kind} with id {id}")]
    NotFound { kind: EntityKind, id: Id },

    /// The store transaction did not complete within the caller's timeout.
    /// Store state is left to the store's own rollback.
    #[error("operation timed out after {0} ms")]
    OperationTimedOut(u64),

    /// Infrastructure failure reported by a persistence adapter.
    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(kind: EntityKind, errors: Vec<FieldError>) -> Self {
        Self::Validation { kind, errors }
    }

    pub fn constraint(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Constraint {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
