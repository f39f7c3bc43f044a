//! The beverage-factory entity catalog.
//!
//! Declares every document kind the back office manages and wires them into
//! a registry in menu order (three groups: personnel & machines,
//! production, sales & deliveries).

use crate::domain::errors::DomainError;
use crate::domain::schema::{
    Constraint, EntityKind, EntitySchema, FieldDef, FieldType, MenuGroup, RefMatch,
    SchemaRegistry,
};

fn sector() -> EntitySchema {
    EntitySchema::new(
        EntityKind::Sector,
        vec![
            FieldDef::required("name", FieldType::Str).with(Constraint::NonEmpty),
            FieldDef::optional("responsible", FieldType::Ref(EntityKind::Employee)),
            FieldDef::optional("members", FieldType::RefSet(EntityKind::Employee)),
            FieldDef::optional("machines", FieldType::RefSet(EntityKind::Machine)),
        ],
    )
}

fn role() -> EntitySchema {
    EntitySchema::new(
        EntityKind::Role,
        vec![
            FieldDef::required("name", FieldType::Str).with(Constraint::NonEmpty),
            FieldDef::required("salary", FieldType::Number).with(Constraint::Min(0.0)),
        ],
    )
}

fn employee() -> EntitySchema {
    EntitySchema::new(
        EntityKind::Employee,
        vec![
            FieldDef::required("name", FieldType::Str).with(Constraint::NonEmpty),
            // National id identifies a person; two employees must not share one.
            FieldDef::required("national_id", FieldType::Str)
                .with(Constraint::Digits)
                .with(Constraint::Unique),
            FieldDef::required("role", FieldType::Ref(EntityKind::Role)),
        ],
    )
}

fn machine() -> EntitySchema {
    EntitySchema::new(
        EntityKind::Machine,
        vec![
            FieldDef::required("name", FieldType::Str).with(Constraint::NonEmpty),
            // Inventory numbers are unique per factory.
            FieldDef::required("inventory_number", FieldType::Int)
                .with(Constraint::PositiveInt)
                .with(Constraint::Unique),
            FieldDef::required("next_maintenance", FieldType::Date),
            FieldDef::optional("maintenance_owner", FieldType::Ref(EntityKind::Employee)),
        ],
    )
}

fn stock_item() -> EntitySchema {
    EntitySchema::new(
        EntityKind::StockItem,
        vec![FieldDef::required("name", FieldType::Str).with(Constraint::NonEmpty)],
    )
}

fn production_line() -> EntitySchema {
    EntitySchema::new(
        EntityKind::ProductionLine,
        vec![
            FieldDef::required("product_name", FieldType::Str).with(Constraint::NonEmpty),
            // A line without raw materials produces nothing.
            FieldDef::required("raw_materials", FieldType::RefSet(EntityKind::StockItem))
                .with(Constraint::NonEmpty),
            FieldDef::required("sector", FieldType::Ref(EntityKind::Sector)),
        ],
    )
}

fn finished_product() -> EntitySchema {
    EntitySchema::new(
        EntityKind::FinishedProduct,
        vec![
            FieldDef::required("brand", FieldType::Str).with(Constraint::NonEmpty),
            FieldDef::required("source_line", FieldType::Ref(EntityKind::ProductionLine)),
            FieldDef::required("product_type", FieldType::Str).with(Constraint::NonEmpty),
            FieldDef::required("manufacture_date", FieldType::Date),
            // Strict: a product expiring on its manufacture day is invalid.
            FieldDef::required("expiry_date", FieldType::Date)
                .with(Constraint::After("manufacture_date")),
        ],
    )
}

fn client() -> EntitySchema {
    EntitySchema::new(
        EntityKind::Client,
        vec![
            FieldDef::required("name", FieldType::Str).with(Constraint::NonEmpty),
            FieldDef::required("address", FieldType::Str).with(Constraint::NonEmpty),
            FieldDef::required("tax_id", FieldType::Str).with(Constraint::Digits),
        ],
    )
}

fn sale() -> EntitySchema {
    EntitySchema::new(
        EntityKind::Sale,
        vec![
            FieldDef::required("sale_code", FieldType::Str)
                .with(Constraint::NonEmpty)
                .with(Constraint::Unique),
            FieldDef::required("date", FieldType::Date),
            FieldDef::required("line_items", FieldType::RefSet(EntityKind::FinishedProduct))
                .with(Constraint::NonEmpty),
            FieldDef::required("total_amount", FieldType::Number).with(Constraint::Min(0.0)),
            FieldDef::required("salesperson", FieldType::Ref(EntityKind::Employee)),
            FieldDef::required("client", FieldType::Ref(EntityKind::Client)),
        ],
    )
}

fn delivery() -> EntitySchema {
    EntitySchema::new(
        EntityKind::Delivery,
        vec![
            FieldDef::required("receipt_date", FieldType::Date),
            FieldDef::required("client", FieldType::Ref(EntityKind::Client)),
            FieldDef::required("receipt_location", FieldType::Str).with(Constraint::NonEmpty),
            FieldDef::required("sale", FieldType::Ref(EntityKind::Sale)),
        ],
    )
    // A delivery goes to the client the sale was made to.
    .with_ref_match(RefMatch {
        local_field: "client",
        via: "sale",
        remote_field: "client",
    })
}

/// Build the full back-office registry, in console menu order.
pub fn factory_catalog() -> Result<SchemaRegistry, DomainError> {
    let mut reg = SchemaRegistry::new();

    reg.define(sector(), MenuGroup::PersonnelAndMachines)?;
    reg.define(role(), MenuGroup::PersonnelAndMachines)?;
    reg.define(employee(), MenuGroup::PersonnelAndMachines)?;
    reg.define(machine(), MenuGroup::PersonnelAndMachines)?;

    reg.define(stock_item(), MenuGroup::Production)?;
    reg.define(production_line(), MenuGroup::Production)?;
    reg.define(finished_product(), MenuGroup::Production)?;

    reg.define(client(), MenuGroup::SalesAndDeliveries)?;
    reg.define(sale(), MenuGroup::SalesAndDeliveries)?;
    reg.define(delivery(), MenuGroup::SalesAndDeliveries)?;

    Ok(reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_registers_all_kinds_in_menu_order() {
        let reg = factory_catalog().unwrap();
        let kinds: Vec<EntityKind> = reg.kinds().iter().map(|d| d.kind).collect();
        assert_eq!(kinds.len(), 10);
        assert_eq!(kinds[0], EntityKind::Sector);
        assert_eq!(kinds[4], EntityKind::StockItem);
        assert_eq!(kinds[9], EntityKind::Delivery);
    }

    #[test]
    fn test_catalog_reference_targets_are_registered() {
        let reg = factory_catalog().unwrap();
        for schema in reg.schemas() {
            for field in schema.reference_fields() {
                let target = field.ty.ref_target().unwrap();
                assert!(
                    reg.schema(target).is_ok(),
                    "{}.{} targets unregistered kind {}",
                    schema.kind,
                    field.name,
                    target
                );
            }
        }
    }

    #[test]
    fn test_ref_match_fields_exist_on_both_sides() {
        let reg = factory_catalog().unwrap();
        for schema in reg.schemas() {
            for m in &schema.ref_matches {
                let via = schema.field(m.via).expect("via field declared");
                let remote_kind = via.ty.ref_target().expect("via is a reference");
                assert!(schema.field(m.local_field).is_some());
                assert!(reg.schema(remote_kind).unwrap().field(m.remote_field).is_some());
            }
        }
    }
}
