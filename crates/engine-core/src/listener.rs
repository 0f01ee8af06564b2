use async_trait::async_trait;
use model::execution::status::JobExecution;
use tracing::{error, info};

/// Notified exactly once per job run with the terminal execution.
///
/// Listeners run after the job reaches COMPLETED or FAILED, in registration
/// order, and cannot alter the outcome. A listener that wants to inspect
/// persisted results queries the sink's store itself.
#[async_trait]
pub trait CompletionListener: Send + Sync {
    async fn on_complete(&self, execution: &JobExecution);
}

/// Default listener: logs the terminal status and counters.
pub struct LogListener;

#[async_trait]
impl CompletionListener for LogListener {
    async fn on_complete(&self, execution: &JobExecution) {
        match execution.exit_message() {
            Some(message) => error!(
                job = %execution.job_name,
                run_id = execution.run_id,
                status = %execution.status,
                error = message,
                "Job finished"
            ),
            None => info!(
                job = %execution.job_name,
                run_id = execution.run_id,
                status = %execution.status,
                records_written = execution.records_written(),
                "Job finished"
            ),
        }
    }
}
