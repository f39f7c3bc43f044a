//! Validation engine. Pure: consults the schema and the candidate record
//! only, never the store.
//!
//! Collects every violation instead of stopping at the first one, so a
//! form can show all field errors in a single round trip. No implicit
//! coercion: a value of the wrong variant is an error, full stop.

use crate::domain::errors::FieldError;
use crate::domain::schema::{Constraint, EntitySchema, FieldDef, FieldType};
use crate::domain::value::{Record, Value};

/// Check `record` against `schema`. Ok means the record is shape-valid;
/// uniqueness and reference existence are later, store-backed stages.
pub fn validate(schema: &EntitySchema, record: &Record) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    for name in record.keys() {
        if schema.field(name).is_none() {
            errors.push(FieldError::new(name, "unknown field"));
        }
    }

    for field in &schema.fields {
        match record.get(field.name) {
            None if field.required => {
                errors.push(FieldError::new(field.name, "required field missing"));
            }
            None => {}
            Some(value) => check_field(field, value, record, &mut errors),
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_field(field: &FieldDef, value: &Value, record: &Record, errors: &mut Vec<FieldError>) {
    let matches_type = matches!(
        (field.ty, value),
        (FieldType::Str, Value::Str(_))
            | (FieldType::Number, Value::Number(_))
            | (FieldType::Int, Value::Int(_))
            | (FieldType::Bool, Value::Bool(_))
            | (FieldType::Date, Value::Date(_))
            | (FieldType::Ref(_), Value::Ref(_))
            | (FieldType::RefSet(_), Value::RefSet(_))
    );
    if !matches_type {
        errors.push(FieldError::new(
            field.name,
            format!("expected {:?} value", field.ty),
        ));
        // Constraints assume a correctly typed value.
        return;
    }

    for constraint in &field.constraints {
        match (constraint, value) {
            (Constraint::NonEmpty, Value::Str(s)) if s.trim().is_empty() => {
                errors.push(FieldError::new(field.name, "must not be blank"));
            }
            // Empty reference sets are the reference stage's cheap
            // pre-check, so the error kind matches the taxonomy there.
            (Constraint::NonEmpty, _) => {}
            (Constraint::Min(min), Value::Number(n)) if *n < *min => {
                errors.push(FieldError::new(
                    field.name,
                    format!("must be at least {min}"),
                ));
            }
            (Constraint::Min(_), _) => {}
            (Constraint::PositiveInt, Value::Int(i)) if *i <= 0 => {
                errors.push(FieldError::new(field.name, "must be a positive integer"));
            }
            (Constraint::PositiveInt, _) => {}
            (Constraint::Digits, Value::Str(s))
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) =>
            {
                errors.push(FieldError::new(field.name, "must contain only digits"));
            }
            (Constraint::Digits, _) => {}
            (Constraint::After(other), Value::Date(d)) => {
                // If the sibling is missing or mistyped its own errors cover it.
                if let Some(Value::Date(earlier)) = record.get(*other) {
                    if d <= earlier {
                        errors.push(FieldError::new(
                            field.name,
                            format!("must be later than {other}"),
                        ));
                    }
                }
            }
            (Constraint::After(_), _) => {}
            // Store-backed; re-evaluated atomically at commit.
            (Constraint::Unique, _) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::factory_catalog;
    use crate::domain::schema::EntityKind;
    use crate::domain::value::Id;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_every_missing_required_field_is_named() {
        let reg = factory_catalog().unwrap();
        let schema = reg.schema(EntityKind::Sale).unwrap();

        let errors = validate(schema, &Record::new()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        for expected in [
            "sale_code",
            "date",
            "line_items",
            "total_amount",
            "salesperson",
            "client",
        ] {
            assert!(fields.contains(&expected), "missing error for {expected}");
        }
    }

    #[test]
    fn test_no_implicit_coercion() {
        let reg = factory_catalog().unwrap();
        let schema = reg.schema(EntityKind::Role).unwrap();

        let mut record = Record::new();
        record.insert("name".into(), Value::Str("Brewer".into()));
        // A numeric string is not a number.
        record.insert("salary".into(), Value::Str("1200".into()));

        let errors = validate(schema, &record).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "salary");
    }

    #[test]
    fn test_negative_salary_rejected() {
        let reg = factory_catalog().unwrap();
        let schema = reg.schema(EntityKind::Role).unwrap();

        let mut record = Record::new();
        record.insert("name".into(), Value::Str("Brewer".into()));
        record.insert("salary".into(), Value::Number(-1.0));

        let errors = validate(schema, &record).unwrap_err();
        assert_eq!(errors[0].field, "salary");
    }

    #[test]
    fn test_expiry_must_be_strictly_after_manufacture() {
        let reg = factory_catalog().unwrap();
        let schema = reg.schema(EntityKind::FinishedProduct).unwrap();

        let mut record = Record::new();
        record.insert("brand".into(), Value::Str("Guaraná Azul".into()));
        record.insert("source_line".into(), Value::Ref(Id::generate()));
        record.insert("product_type".into(), Value::Str("soda".into()));
        record.insert("manufacture_date".into(), date(2026, 3, 1));
        record.insert("expiry_date".into(), date(2026, 3, 1));

        let errors = validate(schema, &record).unwrap_err();
        assert_eq!(errors[0].field, "expiry_date");

        record.insert("expiry_date".into(), date(2026, 2, 1));
        assert!(validate(schema, &record).is_err());

        record.insert("expiry_date".into(), date(2026, 9, 1));
        assert!(validate(schema, &record).is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let reg = factory_catalog().unwrap();
        let schema = reg.schema(EntityKind::StockItem).unwrap();

        let mut record = Record::new();
        record.insert("name".into(), Value::Str("Hops".into()));
        record.insert("color".into(), Value::Str("green".into()));

        let errors = validate(schema, &record).unwrap_err();
        assert_eq!(errors[0].field, "color");
    }

    #[test]
    fn test_tax_id_digits_only() {
        let reg = factory_catalog().unwrap();
        let schema = reg.schema(EntityKind::Client).unwrap();

        let mut record = Record::new();
        record.insert("name".into(), Value::Str("Mercado Central".into()));
        record.insert("address".into(), Value::Str("Rua das Flores 10".into()));
        record.insert("tax_id".into(), Value::Str("12.345.678/0001-00".into()));

        let errors = validate(schema, &record).unwrap_err();
        assert_eq!(errors[0].field, "tax_id");

        record.insert("tax_id".into(), Value::Str("12345678000100".into()));
        assert!(validate(schema, &record).is_ok());
    }

    #[test]
    fn test_inventory_number_positive_integer() {
        let reg = factory_catalog().unwrap();
        let schema = reg.schema(EntityKind::Machine).unwrap();

        let mut record = Record::new();
        record.insert("name".into(), Value::Str("Bottler".into()));
        record.insert("inventory_number".into(), Value::Int(0));
        record.insert("next_maintenance".into(), date(2026, 10, 1));

        let errors = validate(schema, &record).unwrap_err();
        assert_eq!(errors[0].field, "inventory_number");
    }
}
