use connectors::{file::csv::error::FileError, sql::error::DbError};
use engine_core::error::{ConfigError, RepositoryError};
use engine_runtime::error::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid job definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("File source error: {0}")]
    File(#[from] FileError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Connection test failed: {0}")]
    Ping(#[from] tokio_postgres::Error),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Run {run_id} of job `{job}` failed")]
    JobFailed { job: String, run_id: u64 },
}
