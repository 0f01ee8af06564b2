use crate::{error::TransformError, transform::Transform};
use model::{
    core::value::{FieldValue, Value},
    records::row::Record,
};
use tracing::debug;

/// Upper-cases the named string fields of each record. Rejects records
/// where a named field is missing or not a string.
pub struct UppercaseFields {
    fields: Vec<String>,
}

impl UppercaseFields {
    pub fn new(fields: &[String]) -> Self {
        UppercaseFields {
            fields: fields.to_vec(),
        }
    }
}

impl Transform for UppercaseFields {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        let transformed = map_string_fields(record, &self.fields, |s| s.to_uppercase())?;
        debug!(input = %record, output = %transformed, "Upper-cased record");
        Ok(transformed)
    }
}

/// Trims surrounding whitespace from the named string fields.
pub struct TrimFields {
    fields: Vec<String>,
}

impl TrimFields {
    pub fn new(fields: &[String]) -> Self {
        TrimFields {
            fields: fields.to_vec(),
        }
    }
}

impl Transform for TrimFields {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        map_string_fields(record, &self.fields, |s| s.trim().to_string())
    }
}

fn map_string_fields<F>(
    record: &Record,
    fields: &[String],
    f: F,
) -> Result<Record, TransformError>
where
    F: Fn(&str) -> String,
{
    let mut out = Vec::with_capacity(record.field_values.len());
    for fv in &record.field_values {
        let selected = fields.iter().any(|n| n.eq_ignore_ascii_case(&fv.name));
        if !selected {
            out.push(fv.clone());
            continue;
        }
        match &fv.value {
            Value::String(s) => out.push(FieldValue::new(&fv.name, Value::String(f(s)))),
            other => {
                return Err(TransformError::InvalidField {
                    field: fv.name.clone(),
                    reason: format!("expected a string, got {other}"),
                });
            }
        }
    }
    for name in fields {
        if record.get(name).is_none() {
            return Err(TransformError::InvalidField {
                field: name.clone(),
                reason: "field not present in record".to_string(),
            });
        }
    }
    Ok(Record::new(&record.entity, out))
}
