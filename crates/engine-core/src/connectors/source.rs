use crate::error::SourceError;
use async_trait::async_trait;
use model::records::row::Record;

/// A lazy, finite, forward-only producer of records.
///
/// The engine pulls one record at a time and owns all chunking; sources never
/// see chunk boundaries. A source is not rewindable mid-stream — restarting
/// means constructing a new instance.
#[async_trait]
pub trait RecordSource: Send {
    /// Pull the next record. `Ok(None)` signals end of input.
    async fn read(&mut self) -> Result<Option<Record>, SourceError>;
}
