use crate::{error::RepositoryError, state::JobRepository};
use async_trait::async_trait;
use model::execution::status::JobExecution;
use std::path::Path;

/// Sled-backed job repository. Run ids live under `seq:` keys as big-endian
/// counters; execution records under `run:{job}:{run_id}` with zero-padded
/// ids so prefix scans come back in run order.
pub struct SledJobRepository {
    db: sled::Db,
}

impl SledJobRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    #[inline]
    fn run_key(job: &str, run_id: u64) -> String {
        format!("run:{job}:{run_id:020}")
    }

    #[inline]
    fn seq_key(job: &str) -> String {
        format!("seq:{job}")
    }

    fn decode(bytes: &[u8]) -> Result<JobExecution, RepositoryError> {
        bincode::deserialize(bytes).map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl JobRepository for SledJobRepository {
    async fn next_run_id(&self, job: &str) -> Result<u64, RepositoryError> {
        // update_and_fetch is atomic per key, so concurrent launchers of the
        // same job cannot be handed the same id.
        let current = self.db.update_and_fetch(Self::seq_key(job), |old| {
            let next = old
                .and_then(|b| b.try_into().ok())
                .map(u64::from_be_bytes)
                .unwrap_or(0)
                + 1;
            Some(next.to_be_bytes().to_vec())
        })?;

        let bytes = current.ok_or_else(|| {
            RepositoryError::Decode("run id counter disappeared mid-update".to_string())
        })?;
        let id = bytes
            .as_ref()
            .try_into()
            .map(u64::from_be_bytes)
            .map_err(|_| RepositoryError::Decode("run id counter is not a u64".to_string()))?;
        Ok(id)
    }

    async fn save(&self, execution: &JobExecution) -> Result<(), RepositoryError> {
        let key = Self::run_key(&execution.job_name, execution.run_id);
        let bytes =
            bincode::serialize(execution).map_err(|e| RepositoryError::Encode(e.to_string()))?;
        self.db.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    async fn load(&self, job: &str, run_id: u64) -> Result<Option<JobExecution>, RepositoryError> {
        match self.db.get(Self::run_key(job, run_id))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list_runs(&self, job: &str) -> Result<Vec<JobExecution>, RepositoryError> {
        let prefix = format!("run:{job}:");
        let mut runs = Vec::new();
        for item in self.db.scan_prefix(prefix) {
            let (_key, bytes) = item?;
            runs.push(Self::decode(&bytes)?);
        }
        Ok(runs)
    }
}
