//! Core domain layer. No external I/O dependencies.
//!
//! Value model, schemas, the factory catalog and validation live here.
//! Dependencies flow inward.

pub mod catalog;
pub mod errors;
pub mod schema;
pub mod validate;
pub mod value;

pub use errors::{DomainError, FieldError};
pub use schema::{
    Constraint, EntityKind, EntitySchema, FieldDef, FieldType, KindDescriptor, MenuGroup,
    RefMatch, SchemaRegistry,
};
pub use value::{Document, Id, Record, Value};
