use engine_core::error::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error reading CSV file: {0}")]
    Read(String),

    #[error("Row shape mismatch: {0}")]
    Shape(String),
}

impl From<FileError> for SourceError {
    fn from(e: FileError) -> Self {
        match e {
            FileError::Io(io) => SourceError::Io(io),
            FileError::Csv(csv) => SourceError::Malformed(csv.to_string()),
            FileError::Shape(msg) => SourceError::Malformed(msg),
            other => SourceError::Read(other.to_string()),
        }
    }
}
