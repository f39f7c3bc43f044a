//! Schema model and registry.
//!
//! Shapes are data, not derive macros: the admin console (an external
//! collaborator) reads them to render forms, and the validation and
//! referential-integrity stages interpret them at runtime.

use crate::domain::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

///
/// EntityKind
///

/// The document kinds of the factory back office. One collection per kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sector,
    Role,
    Employee,
    Machine,
    StockItem,
    ProductionLine,
    FinishedProduct,
    Client,
    Sale,
    Delivery,
}

impl EntityKind {
    /// Collection name used by persistence adapters and logs.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::Role => "role",
            Self::Employee => "employee",
            Self::Machine => "machine",
            Self::StockItem => "stock_item",
            Self::ProductionLine => "production_line",
            Self::FinishedProduct => "finished_product",
            Self::Client => "client",
            Self::Sale => "sale",
            Self::Delivery => "delivery",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

///
/// FieldType
///

/// Declared primitive or reference type of a field. Mirrors `Value` variant
/// for variant; validation accepts exactly the matching variant, never a
/// coercible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Str,
    Number,
    Int,
    Bool,
    Date,
    /// Single reference to a document of the target kind.
    Ref(EntityKind),
    /// Set of references to documents of the target kind.
    RefSet(EntityKind),
}

impl FieldType {
    /// Target kind if this is a reference field (single or set).
    #[must_use]
    pub const fn ref_target(self) -> Option<EntityKind> {
        match self {
            Self::Ref(k) | Self::RefSet(k) => Some(k),
            _ => None,
        }
    }
}

///
/// Constraint
///

/// Declarative field invariant, checked by the validation engine
/// (everything except `Unique`, which the store re-evaluates at commit).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Strings must be non-blank; reference sets must contain at least one
    /// element. Checked before any store lookup.
    NonEmpty,
    /// Numbers must be >= the given bound.
    Min(f64),
    /// Integers must be > 0.
    PositiveInt,
    /// Strings must consist solely of ASCII digits (national ids).
    Digits,
    /// Value must be unique across the kind's collection.
    Unique,
    /// Date must be strictly later than the named sibling date field.
    After(&'static str),
}

///
/// FieldDef / EntitySchema
///

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl FieldDef {
    #[must_use]
    pub fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, c: Constraint) -> Self {
        self.constraints.push(c);
        self
    }

    #[must_use]
    pub fn has(&self, c: &Constraint) -> bool {
        self.constraints.contains(c)
    }
}

/// Cross-record consistency rule: the local reference field must point at
/// the same document as `remote_field` of the document referenced by `via`.
/// Needs a store lookup, so it is checked by the reference stage, not the
/// pure validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefMatch {
    pub local_field: &'static str,
    pub via: &'static str,
    pub remote_field: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ref_matches: Vec<RefMatch>,
}

impl EntitySchema {
    #[must_use]
    pub fn new(kind: EntityKind, fields: Vec<FieldDef>) -> Self {
        Self {
            kind,
            fields,
            ref_matches: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_ref_match(mut self, m: RefMatch) -> Self {
        self.ref_matches.push(m);
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Reference fields (single and set) of this schema.
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.ty.ref_target().is_some())
    }
}

///
/// Menu grouping
///

/// Console menu group. Mirrors the back office's three sub-menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuGroup {
    PersonnelAndMachines,
    Production,
    SalesAndDeliveries,
}

impl MenuGroup {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonnelAndMachines => "Personnel & machines",
            Self::Production => "Production",
            Self::SalesAndDeliveries => "Sales & deliveries",
        }
    }
}

/// Entry of the ordered kind listing consumed by the console menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDescriptor {
    pub kind: EntityKind,
    pub group: MenuGroup,
}

///
/// SchemaRegistry
///

/// Holds the registered shape of every entity kind. Kinds register exactly
/// once; re-registration with an identical shape is a no-op, a different
/// shape is a `SchemaConflict` (programmer error, aborts startup).
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entities: BTreeMap<EntityKind, EntitySchema>,
    order: Vec<KindDescriptor>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, schema: EntitySchema, group: MenuGroup) -> Result<(), DomainError> {
        let kind = schema.kind;
        match self.entities.get(&kind) {
            Some(existing) if *existing == schema => Ok(()),
            Some(_) => Err(DomainError::SchemaConflict(kind)),
            None => {
                self.entities.insert(kind, schema);
                self.order.push(KindDescriptor { kind, group });
                Ok(())
            }
        }
    }

    pub fn schema(&self, kind: EntityKind) -> Result<&EntitySchema, DomainError> {
        self.entities
            .get(&kind)
            .ok_or(DomainError::UnknownEntity(kind))
    }

    /// Ordered kind descriptors, in registration order (menu order).
    #[must_use]
    pub fn kinds(&self) -> &[KindDescriptor] {
        &self.order
    }

    /// All registered schemas, in registration order. Used by the deletion
    /// planner to discover inbound references.
    pub fn schemas(&self) -> impl Iterator<Item = &EntitySchema> {
        self.order.iter().map(|d| &self.entities[&d.kind])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_schema() -> EntitySchema {
        EntitySchema::new(
            EntityKind::Role,
            vec![
                FieldDef::required("name", FieldType::Str).with(Constraint::NonEmpty),
                FieldDef::required("salary", FieldType::Number).with(Constraint::Min(0.0)),
            ],
        )
    }

    #[test]
    fn test_redefine_identical_shape_is_idempotent() {
        let mut reg = SchemaRegistry::new();
        reg.define(role_schema(), MenuGroup::PersonnelAndMachines)
            .unwrap();
        reg.define(role_schema(), MenuGroup::PersonnelAndMachines)
            .unwrap();
        assert_eq!(reg.kinds().len(), 1);
    }

    #[test]
    fn test_redefine_different_shape_conflicts() {
        let mut reg = SchemaRegistry::new();
        reg.define(role_schema(), MenuGroup::PersonnelAndMachines)
            .unwrap();
        let other = EntitySchema::new(
            EntityKind::Role,
            vec![FieldDef::required("name", FieldType::Str)],
        );
        let err = reg
            .define(other, MenuGroup::PersonnelAndMachines)
            .unwrap_err();
        assert!(matches!(err, DomainError::SchemaConflict(EntityKind::Role)));
    }

    #[test]
    fn test_unknown_kind_lookup_fails() {
        let reg = SchemaRegistry::new();
        let err = reg.schema(EntityKind::Sale).unwrap_err();
        assert!(matches!(err, DomainError::UnknownEntity(EntityKind::Sale)));
    }
}
