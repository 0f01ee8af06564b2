use crate::file::csv::{error::FileError, settings::CsvSettings};
use async_trait::async_trait;
use engine_core::{connectors::source::RecordSource, error::SourceError};
use model::{
    core::value::{FieldValue, Value},
    records::row::Record,
};
use std::fs::File;
use tracing::debug;

/// Streams a delimited text file as records, one line at a time.
///
/// Forward-only: the underlying iterator is consumed as the engine reads.
/// Re-running a step over the same file means opening a new source.
pub struct FlatFileSource {
    settings: CsvSettings,
    rows: csv::StringRecordsIntoIter<File>,
    rows_read: usize,
}

impl FlatFileSource {
    pub fn open(settings: CsvSettings) -> Result<Self, FileError> {
        if !settings.path.is_file() {
            return Err(FileError::NotFound(settings.path.display().to_string()));
        }
        let reader = csv::ReaderBuilder::new()
            .delimiter(settings.delimiter as u8)
            .has_headers(settings.has_headers)
            .from_path(&settings.path)?;

        debug!(
            path = %settings.path.display(),
            entity = %settings.entity,
            fields = settings.fields.len(),
            "Opened flat file source"
        );

        Ok(FlatFileSource {
            rows: reader.into_records(),
            settings,
            rows_read: 0,
        })
    }

    fn to_record(&self, raw: &csv::StringRecord) -> Result<Record, FileError> {
        if raw.len() != self.settings.fields.len() {
            return Err(FileError::Shape(format!(
                "line {}: expected {} columns, found {}",
                self.rows_read + 1,
                self.settings.fields.len(),
                raw.len()
            )));
        }
        let field_values = self
            .settings
            .fields
            .iter()
            .zip(raw.iter())
            .map(|(name, value)| FieldValue::new(name, Value::String(value.to_string())))
            .collect();
        Ok(Record::new(&self.settings.entity, field_values))
    }
}

#[async_trait]
impl RecordSource for FlatFileSource {
    async fn read(&mut self) -> Result<Option<Record>, SourceError> {
        match self.rows.next() {
            Some(Ok(raw)) => {
                let record = self.to_record(&raw)?;
                self.rows_read += 1;
                Ok(Some(record))
            }
            Some(Err(e)) => Err(FileError::from(e).into()),
            None => Ok(None),
        }
    }
}
