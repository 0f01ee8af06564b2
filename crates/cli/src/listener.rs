use async_trait::async_trait;
use connectors::sql::postgres::report::PgReport;
use engine_core::listener::CompletionListener;
use model::execution::status::{ExitStatus, JobExecution};
use tracing::{info, warn};

const SAMPLE_LIMIT: i64 = 5;

/// On a completed run, queries the target table and reports what the job
/// actually persisted. Failed runs are left to the log listener.
pub struct RowCountListener {
    report: PgReport,
    table: String,
    columns: Vec<String>,
}

impl RowCountListener {
    pub fn new(report: PgReport, table: &str, columns: Vec<String>) -> Self {
        RowCountListener {
            report,
            table: table.to_string(),
            columns,
        }
    }
}

#[async_trait]
impl CompletionListener for RowCountListener {
    async fn on_complete(&self, execution: &JobExecution) {
        if execution.status != ExitStatus::Completed {
            return;
        }

        match self.report.count(&self.table).await {
            Ok(count) => info!(
                job = %execution.job_name,
                run_id = execution.run_id,
                table = %self.table,
                rows = count,
                "Verified persisted results"
            ),
            Err(error) => {
                warn!(table = %self.table, %error, "Could not count persisted rows");
                return;
            }
        }

        match self
            .report
            .sample(&self.table, &self.columns, SAMPLE_LIMIT)
            .await
        {
            Ok(records) => {
                for record in records {
                    info!(table = %self.table, "Found {record} in the database");
                }
            }
            Err(error) => warn!(table = %self.table, %error, "Could not sample persisted rows"),
        }
    }
}
