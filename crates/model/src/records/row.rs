use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single record flowing through a step. Identity is structural: two
/// records with the same entity and field values compare equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl Record {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        Record {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Field values in declaration order, e.g. for positional SQL binding.
    pub fn values(&self) -> Vec<Value> {
        self.field_values.iter().map(|f| f.value.clone()).collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.entity)?;
        for (i, fv) in self.field_values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", fv.name, fv.value)?;
        }
        write!(f, "]")
    }
}
