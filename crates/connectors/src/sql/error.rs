use engine_core::error::SinkError;
use thiserror::Error;

/// All errors coming from the database layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Write error: {0}")]
    Write(String),
}

impl From<DbError> for SinkError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Io(io) => SinkError::Io(io),
            DbError::Sql(sql) => SinkError::Write(sql.to_string()),
            DbError::Write(msg) => SinkError::Write(msg),
            other => SinkError::Connection(other.to_string()),
        }
    }
}
