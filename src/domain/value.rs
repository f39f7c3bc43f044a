//! Value model. Pure data structures for documents in the store.
//!
//! Values are explicitly typed; nothing in the core coerces one primitive
//! into another. A caller that sends a string where a number is declared
//! gets a validation error, not a silent conversion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque document identifier. ULID string, generated at create time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Mint a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Str(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    /// Identifier of a document of the field's declared target kind.
    Ref(Id),
    /// Ordered set of identifiers; element order is preserved so error
    /// reporting stays deterministic.
    RefSet(Vec<Id>),
}

/// A candidate or stored document body: field name -> value.
pub type Record = BTreeMap<String, Value>;

/// A stored document together with its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Id,
    pub record: Record,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = Id::generate();
        let b = Id::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }
}
