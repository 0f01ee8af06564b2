use crate::error::SinkError;
use async_trait::async_trait;
use model::records::row::Record;

/// A durable destination for transformed records.
///
/// `write_chunk` must treat the slice as a single commit unit: either every
/// record in it becomes durable or none do. Record order within the slice is
/// preserved by the engine and must be preserved by the sink.
#[async_trait]
pub trait RecordSink: Send {
    async fn write_chunk(&mut self, records: &[Record]) -> Result<(), SinkError>;
}
