use crate::{error::EngineError, execution::step::Step};
use engine_core::{
    error::ConfigError, listener::CompletionListener, metrics::Metrics, state::JobRepository,
};
use model::execution::status::{ExitStatus, JobExecution};
use std::sync::Arc;
use tracing::{info, warn};

/// Run a job to its terminal state and return the recorded execution.
pub async fn run(
    job: Job,
    repository: Arc<dyn JobRepository>,
) -> Result<JobExecution, EngineError> {
    JobExecutor::new(job, repository).execute().await
}

/// A named, ordered sequence of steps plus completion listeners.
///
/// Jobs are wired by explicit construction: already-built steps go into the
/// builder, no runtime discovery. A job value is consumed by a run; running
/// the same definition again means rebuilding it, and the fresh run id keeps
/// the two executions fully independent.
pub struct Job {
    name: String,
    steps: Vec<Step>,
    listeners: Vec<Arc<dyn CompletionListener>>,
}

impl Job {
    pub fn builder(name: &str) -> JobBuilder {
        JobBuilder {
            name: name.to_string(),
            steps: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

pub struct JobBuilder {
    name: String,
    steps: Vec<Step>,
    listeners: Vec<Arc<dyn CompletionListener>>,
}

impl JobBuilder {
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn CompletionListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> Result<Job, ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::MissingCollaborator(format!(
                "job `{}` declares no steps",
                self.name
            )));
        }
        Ok(Job {
            name: self.name,
            steps: self.steps,
            listeners: self.listeners,
        })
    }
}

struct JobExecutor {
    job: Job,
    repository: Arc<dyn JobRepository>,
    metrics: Metrics,
}

impl JobExecutor {
    fn new(job: Job, repository: Arc<dyn JobRepository>) -> Self {
        Self {
            job,
            repository,
            metrics: Metrics::new(),
        }
    }

    async fn execute(mut self) -> Result<JobExecution, EngineError> {
        let start_time = std::time::Instant::now();
        let run_id = self.repository.next_run_id(&self.job.name).await?;

        // A run id the repository has already seen means two launchers share
        // one identity. Fatal before any step executes.
        if self.repository.load(&self.job.name, run_id).await?.is_some() {
            return Err(EngineError::Config(ConfigError::DuplicateRunId {
                job: self.job.name.clone(),
                run_id,
            }));
        }

        let mut execution = JobExecution::started(&self.job.name, run_id);
        self.repository.save(&execution).await?;

        info!(job = %self.job.name, run_id, "Starting job run");

        let total_steps = self.job.steps.len();
        let mut failed = false;
        for (idx, step) in self.job.steps.iter_mut().enumerate() {
            info!(
                job = %self.job.name,
                step = %step.name(),
                "Processing step {}/{}",
                idx + 1,
                total_steps
            );

            let step_execution = step.execute(&self.metrics).await;
            let step_failed = step_execution.is_failed();
            execution.record_step(step_execution);

            if step_failed {
                // First failure halts the sequence; remaining steps never start.
                if idx + 1 < total_steps {
                    warn!(
                        job = %self.job.name,
                        skipped = total_steps - idx - 1,
                        "Halting job after failed step"
                    );
                }
                failed = true;
                break;
            }
        }

        let status = if failed {
            ExitStatus::Failed
        } else {
            ExitStatus::Completed
        };
        execution.finish(status);
        self.repository.save(&execution).await?;

        let snapshot = self.metrics.snapshot();
        info!(
            job = %self.job.name,
            run_id,
            status = %status,
            records_read = snapshot.records_read,
            records_written = snapshot.records_written,
            chunks_written = snapshot.chunks_written,
            failures = snapshot.failure_count,
            duration_ms = start_time.elapsed().as_millis(),
            "Job run finished"
        );

        for listener in &self.job.listeners {
            listener.on_complete(&execution).await;
        }

        Ok(execution)
    }
}
