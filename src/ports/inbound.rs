//! Inbound port. The admin console (adapter) calls into the application.
//!
//! Everything a generic CRUD console needs: the kind menu, per-kind
//! schemas to render forms from, and the guarded CRUD operations.

use crate::domain::{DomainError, Document, EntityKind, EntitySchema, Id, KindDescriptor, Record};

#[async_trait::async_trait]
pub trait AdminPort: Send + Sync {
    /// Ordered kind descriptors for menu grouping.
    fn kinds(&self) -> &[KindDescriptor];

    /// Registered shape of a kind, for form rendering.
    fn schema(&self, kind: EntityKind) -> Result<&EntitySchema, DomainError>;

    /// Validate + check references + commit. Returns the assigned id.
    async fn create(&self, kind: EntityKind, record: Record) -> Result<Id, DomainError>;

    /// Merge-replace patch: listed fields replace, omitted fields keep
    /// their stored value. Revalidates the merged record.
    async fn update(&self, kind: EntityKind, id: &Id, patch: Record) -> Result<(), DomainError>;

    /// Apply the cascade policy, then delete, as one atomic batch.
    async fn delete(&self, kind: EntityKind, id: &Id) -> Result<(), DomainError>;

    async fn get(&self, kind: EntityKind, id: &Id) -> Result<Document, DomainError>;

    /// Every document of the kind, for list views.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>, DomainError>;
}
