use engine_core::error::{ConfigError, RepositoryError, SinkError, SourceError, TransformError};
use thiserror::Error;

/// Top-level errors for the batch engine.
///
/// Step-level failures (source/transform/sink) do not surface here: they are
/// folded into a FAILED `StepExecution` and a FAILED job. `EngineError`
/// covers failures that prevent a run from starting or being recorded.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Why a step aborted. Carried inside the FAILED `StepExecution`.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}
