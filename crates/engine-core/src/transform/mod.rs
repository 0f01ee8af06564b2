use crate::error::TransformError;
use model::records::row::Record;

pub mod pipeline;
pub mod text;

/// A pure 1:1 mapping from input record to output record.
///
/// A transform never drops or duplicates records and must not retain mutable
/// state across invocations within a step. It may reject a record with a
/// domain error, which aborts the enclosing step.
pub trait Transform: Send + Sync {
    fn apply(&self, record: &Record) -> Result<Record, TransformError>;
}
