use crate::error::RepositoryError;
use async_trait::async_trait;
use model::execution::status::JobExecution;

pub mod sled_store;

/// Persists run identity and run-level execution state.
///
/// The repository is the only state carried between runs of the same job
/// definition: it allocates strictly increasing run ids and keeps the
/// terminal execution record of every run.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Allocate the next run id for `job`. Ids are strictly increasing per
    /// job name across process restarts.
    async fn next_run_id(&self, job: &str) -> Result<u64, RepositoryError>;

    /// Upsert the execution record for (job, run_id).
    async fn save(&self, execution: &JobExecution) -> Result<(), RepositoryError>;

    async fn load(&self, job: &str, run_id: u64) -> Result<Option<JobExecution>, RepositoryError>;

    /// All recorded runs of `job`, in run-id order.
    async fn list_runs(&self, job: &str) -> Result<Vec<JobExecution>, RepositoryError>;
}
