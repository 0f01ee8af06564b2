use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a step or job run. Steps only ever carry a terminal
/// state; a job recorded as `Running` in the repository was interrupted
/// before reaching one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Running => write!(f, "RUNNING"),
            ExitStatus::Completed => write!(f, "COMPLETED"),
            ExitStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Outcome of a single step: terminal status plus read/write counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecution {
    pub name: String,
    pub status: ExitStatus,
    pub records_read: u64,
    pub records_written: u64,
    pub chunks_written: u64,
    /// Error detail when the step failed.
    pub exit_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StepExecution {
    pub fn is_failed(&self) -> bool {
        self.status == ExitStatus::Failed
    }
}

/// Outcome of one job run, persisted by the job repository. Successive
/// runs of the same job definition carry strictly increasing `run_id`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecution {
    pub job_name: String,
    pub run_id: u64,
    pub status: ExitStatus,
    pub steps: Vec<StepExecution>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobExecution {
    pub fn started(job_name: &str, run_id: u64) -> Self {
        JobExecution {
            job_name: job_name.to_string(),
            run_id,
            status: ExitStatus::Running,
            steps: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_step(&mut self, step: StepExecution) {
        self.steps.push(step);
    }

    pub fn finish(&mut self, status: ExitStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    pub fn records_written(&self) -> u64 {
        self.steps.iter().map(|s| s.records_written).sum()
    }

    /// Error detail of the first failed step, if any.
    pub fn exit_message(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.is_failed())
            .and_then(|s| s.exit_message.as_deref())
    }
}
