use thiserror::Error;

/// The source cannot produce the next record. Fatal to the step; the
/// in-progress chunk is not flushed.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Read error: {0}")]
    Read(String),
}

/// A chunk flush was rejected. Fatal to the step; earlier chunks stay
/// committed, the failing chunk's records do not.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Write error: {0}")]
    Write(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// A transform rejected a record. Fatal to the step at that record.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Transform failed: {0}")]
    Failed(String),
}

/// Invalid job wiring, detected before any step executes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Chunk size must be at least 1, got {0}")]
    InvalidChunkSize(usize),

    #[error("Run {run_id} of job `{job}` already exists")]
    DuplicateRunId { job: String, run_id: u64 },

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Failed to encode execution record: {0}")]
    Encode(String),

    #[error("Failed to decode execution record: {0}")]
    Decode(String),
}
