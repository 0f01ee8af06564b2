use crate::error::StepError;
use chrono::Utc;
use engine_core::{
    connectors::{sink::RecordSink, source::RecordSource},
    error::ConfigError,
    metrics::Metrics,
    transform::Transform,
};
use model::{
    execution::status::{ExitStatus, StepExecution},
    records::chunk::Chunk,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// One source → transform → sink stage of a job.
///
/// A step is executed exactly once per run: the job consumes it, and its
/// source is not rewindable. Re-running a job means rebuilding its steps.
pub struct Step {
    name: String,
    source: Box<dyn RecordSource>,
    transform: Arc<dyn Transform>,
    sink: Box<dyn RecordSink>,
    chunk_size: usize,
}

#[derive(Default)]
struct Counters {
    records_read: u64,
    records_written: u64,
    chunks_written: u64,
}

impl Step {
    pub fn new(
        name: &str,
        source: Box<dyn RecordSource>,
        transform: Arc<dyn Transform>,
        sink: Box<dyn RecordSink>,
        chunk_size: usize,
    ) -> Result<Self, ConfigError> {
        if chunk_size < 1 {
            return Err(ConfigError::InvalidChunkSize(chunk_size));
        }
        Ok(Step {
            name: name.to_string(),
            source,
            transform,
            sink,
            chunk_size,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drive the step to its terminal state.
    ///
    /// Records are pulled one at a time, transformed, and buffered; a full
    /// chunk is written to the sink as a single commit unit, and the final
    /// partial chunk is written on source exhaustion. Any source, transform,
    /// or sink error aborts the step immediately without flushing the
    /// in-progress chunk — chunks already written stay committed.
    pub async fn execute(&mut self, metrics: &Metrics) -> StepExecution {
        let started_at = Utc::now();
        info!(step = %self.name, chunk_size = self.chunk_size, "Starting step");

        let mut counters = Counters::default();
        let outcome = self.drive_chunks(metrics, &mut counters).await;

        let (status, exit_message) = match outcome {
            Ok(()) => {
                info!(
                    step = %self.name,
                    records_read = counters.records_read,
                    records_written = counters.records_written,
                    chunks_written = counters.chunks_written,
                    "Step completed"
                );
                (ExitStatus::Completed, None)
            }
            Err(e) => {
                error!(
                    step = %self.name,
                    records_read = counters.records_read,
                    records_written = counters.records_written,
                    error = %e,
                    "Step failed"
                );
                metrics.increment_failures(1);
                (ExitStatus::Failed, Some(e.to_string()))
            }
        };

        StepExecution {
            name: self.name.clone(),
            status,
            records_read: counters.records_read,
            records_written: counters.records_written,
            chunks_written: counters.chunks_written,
            exit_message,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn drive_chunks(
        &mut self,
        metrics: &Metrics,
        counters: &mut Counters,
    ) -> Result<(), StepError> {
        let mut chunk = Chunk::new(self.chunk_size);

        while let Some(record) = self.source.read().await? {
            counters.records_read += 1;
            metrics.increment_read(1);

            let transformed = self.transform.apply(&record)?;
            if chunk.push(transformed) {
                self.flush(&mut chunk, metrics, counters).await?;
            }
        }

        // Final partial chunk; never an empty write.
        if !chunk.is_empty() {
            self.flush(&mut chunk, metrics, counters).await?;
        }

        Ok(())
    }

    async fn flush(
        &mut self,
        chunk: &mut Chunk,
        metrics: &Metrics,
        counters: &mut Counters,
    ) -> Result<(), StepError> {
        let records = chunk.drain();
        self.sink.write_chunk(&records).await?;

        counters.records_written += records.len() as u64;
        counters.chunks_written += 1;
        metrics.increment_written(records.len() as u64);
        metrics.increment_chunks(1);

        debug!(
            step = %self.name,
            rows = records.len(),
            chunk = counters.chunks_written,
            "Chunk committed"
        );
        Ok(())
    }
}
