use crate::{
    error::EngineError,
    execution::{
        executor::{self, Job},
        step::Step,
    },
};
use async_trait::async_trait;
use engine_core::{
    connectors::{sink::RecordSink, source::RecordSource},
    error::{ConfigError, SinkError, SourceError, TransformError},
    listener::CompletionListener,
    metrics::Metrics,
    state::{JobRepository, sled_store::SledJobRepository},
    transform::{Transform, pipeline::Identity, text::UppercaseFields},
};
use model::{
    core::value::{FieldValue, Value},
    execution::status::{ExitStatus, JobExecution},
    records::row::Record,
};
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};
use tempfile::tempdir;

fn numbered(n: i64) -> Record {
    Record::new("item", vec![FieldValue::new("n", Value::Int(n))])
}

fn account(first: &str, last: &str) -> Record {
    Record::new(
        "account",
        vec![
            FieldValue::new("first_name", Value::String(first.into())),
            FieldValue::new("last_name", Value::String(last.into())),
        ],
    )
}

// Source fed from a vec, optionally erroring once the queue is drained
// down to `fail_after_reads` successful reads.
struct MockSource {
    records: VecDeque<Record>,
    reads: u64,
    fail_after_reads: Option<u64>,
}

impl MockSource {
    fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
            reads: 0,
            fail_after_reads: None,
        }
    }

    fn failing_after(records: Vec<Record>, reads: u64) -> Self {
        Self {
            records: records.into(),
            reads: 0,
            fail_after_reads: Some(reads),
        }
    }
}

#[async_trait]
impl RecordSource for MockSource {
    async fn read(&mut self) -> Result<Option<Record>, SourceError> {
        if let Some(limit) = self.fail_after_reads
            && self.reads >= limit
        {
            return Err(SourceError::Read("simulated read failure".to_string()));
        }
        self.reads += 1;
        Ok(self.records.pop_front())
    }
}

// Sink capturing every flush; the capture handle outlives the sink so tests
// can inspect chunks after the step consumed it.
#[derive(Clone, Default)]
struct SinkCapture {
    flushes: Arc<Mutex<Vec<Vec<Record>>>>,
}

impl SinkCapture {
    fn flush_sizes(&self) -> Vec<usize> {
        self.flushes.lock().unwrap().iter().map(Vec::len).collect()
    }

    fn flattened(&self) -> Vec<Record> {
        self.flushes.lock().unwrap().iter().flatten().cloned().collect()
    }
}

struct MockSink {
    capture: SinkCapture,
    fail_on_flush: Option<usize>,
    flush_calls: usize,
}

impl MockSink {
    fn new(capture: &SinkCapture) -> Self {
        Self {
            capture: capture.clone(),
            fail_on_flush: None,
            flush_calls: 0,
        }
    }

    fn failing_on(capture: &SinkCapture, flush: usize) -> Self {
        Self {
            capture: capture.clone(),
            fail_on_flush: Some(flush),
            flush_calls: 0,
        }
    }
}

#[async_trait]
impl RecordSink for MockSink {
    async fn write_chunk(&mut self, records: &[Record]) -> Result<(), SinkError> {
        self.flush_calls += 1;
        if self.fail_on_flush == Some(self.flush_calls) {
            return Err(SinkError::Write("simulated flush rejection".to_string()));
        }
        self.capture
            .flushes
            .lock()
            .unwrap()
            .push(records.to_vec());
        Ok(())
    }
}

// Rejects the record whose `n` field equals the configured value. Stateless,
// so repeated application over the same input behaves identically.
struct FailOn {
    n: i64,
}

impl Transform for FailOn {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        if record.get_value("n") == Value::Int(self.n) {
            return Err(TransformError::Failed(format!(
                "record {} rejected",
                self.n
            )));
        }
        Ok(record.clone())
    }
}

#[derive(Default)]
struct ListenerSpy {
    invocations: AtomicU64,
    last: Mutex<Option<JobExecution>>,
}

#[async_trait]
impl CompletionListener for ListenerSpy {
    async fn on_complete(&self, execution: &JobExecution) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(execution.clone());
    }
}

fn step_with(
    source: MockSource,
    transform: Arc<dyn Transform>,
    sink: MockSink,
    chunk_size: usize,
) -> Step {
    Step::new("load", Box::new(source), transform, Box::new(sink), chunk_size)
        .expect("valid step")
}

#[tokio::test]
async fn writes_every_record_exactly_once() {
    let capture = SinkCapture::default();
    let records: Vec<Record> = (1..=25).map(numbered).collect();
    let mut step = step_with(
        MockSource::new(records.clone()),
        Arc::new(Identity),
        MockSink::new(&capture),
        10,
    );

    let execution = step.execute(&Metrics::new()).await;

    assert_eq!(execution.status, ExitStatus::Completed);
    assert_eq!(execution.records_read, 25);
    assert_eq!(execution.records_written, 25);
    assert_eq!(capture.flattened().len(), 25);
}

#[tokio::test]
async fn flush_count_is_ceil_of_records_over_chunk_size() {
    // 25 records, chunk 10: ceil(25/10) = 3 flushes, last one partial.
    let capture = SinkCapture::default();
    let mut step = step_with(
        MockSource::new((1..=25).map(numbered).collect()),
        Arc::new(Identity),
        MockSink::new(&capture),
        10,
    );
    let execution = step.execute(&Metrics::new()).await;
    assert_eq!(execution.chunks_written, 3);
    assert_eq!(capture.flush_sizes(), vec![10, 10, 5]);

    // Exact multiple: every flush full, none empty.
    let capture = SinkCapture::default();
    let mut step = step_with(
        MockSource::new((1..=20).map(numbered).collect()),
        Arc::new(Identity),
        MockSink::new(&capture),
        10,
    );
    let execution = step.execute(&Metrics::new()).await;
    assert_eq!(execution.chunks_written, 2);
    assert_eq!(capture.flush_sizes(), vec![10, 10]);
}

#[tokio::test]
async fn empty_source_completes_without_flushing() {
    let capture = SinkCapture::default();
    let mut step = step_with(
        MockSource::new(Vec::new()),
        Arc::new(Identity),
        MockSink::new(&capture),
        10,
    );
    let execution = step.execute(&Metrics::new()).await;

    assert_eq!(execution.status, ExitStatus::Completed);
    assert_eq!(execution.records_read, 0);
    assert!(capture.flush_sizes().is_empty());
}

#[tokio::test]
async fn order_is_preserved_across_chunks() {
    let capture = SinkCapture::default();
    let records: Vec<Record> = (1..=7).map(numbered).collect();
    let mut step = step_with(
        MockSource::new(records.clone()),
        Arc::new(Identity),
        MockSink::new(&capture),
        3,
    );
    step.execute(&Metrics::new()).await;

    assert_eq!(capture.flattened(), records);
}

#[tokio::test]
async fn transform_failure_never_flushes_the_failing_chunk() {
    // Fails on record 13 with chunk size 5: floor(12/5) = 2 complete
    // flushes, the third chunk (records 11..12) is discarded.
    let capture = SinkCapture::default();
    let mut step = step_with(
        MockSource::new((1..=20).map(numbered).collect()),
        Arc::new(FailOn { n: 13 }),
        MockSink::new(&capture),
        5,
    );
    let execution = step.execute(&Metrics::new()).await;

    assert_eq!(execution.status, ExitStatus::Failed);
    assert_eq!(execution.records_read, 13);
    assert_eq!(execution.records_written, 10);
    assert_eq!(capture.flush_sizes(), vec![5, 5]);
    assert!(execution.exit_message.unwrap().contains("rejected"));
}

#[tokio::test]
async fn source_failure_aborts_without_partial_flush() {
    let capture = SinkCapture::default();
    let mut step = step_with(
        MockSource::failing_after((1..=10).map(numbered).collect(), 7),
        Arc::new(Identity),
        MockSink::new(&capture),
        5,
    );
    let execution = step.execute(&Metrics::new()).await;

    assert_eq!(execution.status, ExitStatus::Failed);
    assert_eq!(execution.records_read, 7);
    // First chunk of 5 committed before the failure; the buffered 2 are not.
    assert_eq!(capture.flush_sizes(), vec![5]);
}

#[tokio::test]
async fn rejects_zero_chunk_size() {
    let capture = SinkCapture::default();
    let result = Step::new(
        "load",
        Box::new(MockSource::new(Vec::new())),
        Arc::new(Identity),
        Box::new(MockSink::new(&capture)),
        0,
    );
    assert!(matches!(result, Err(ConfigError::InvalidChunkSize(0))));
}

#[tokio::test]
async fn job_with_no_steps_is_rejected() {
    let result = Job::builder("empty").build();
    assert!(matches!(result, Err(ConfigError::MissingCollaborator(_))));
}

#[tokio::test]
async fn uppercase_job_end_to_end() {
    // Two records, chunk size 10: a single flush carrying both, job and
    // step COMPLETED, listener notified exactly once.
    let dir = tempdir().unwrap();
    let repository: Arc<dyn JobRepository> =
        Arc::new(SledJobRepository::open(dir.path()).expect("open sled"));
    let capture = SinkCapture::default();
    let listener = Arc::new(ListenerSpy::default());

    let fields = ["first_name".to_string(), "last_name".to_string()];
    let step = step_with(
        MockSource::new(vec![account("john", "doe"), account("jane", "doe")]),
        Arc::new(UppercaseFields::new(&fields)),
        MockSink::new(&capture),
        10,
    );
    let job = Job::builder("import-accounts")
        .step(step)
        .listener(listener.clone())
        .build()
        .unwrap();

    let execution = executor::run(job, repository.clone()).await.unwrap();

    assert_eq!(execution.status, ExitStatus::Completed);
    assert_eq!(execution.run_id, 1);
    assert_eq!(execution.steps.len(), 1);
    assert_eq!(execution.steps[0].status, ExitStatus::Completed);
    assert_eq!(
        capture.flattened(),
        vec![account("JOHN", "DOE"), account("JANE", "DOE")]
    );
    assert_eq!(capture.flush_sizes(), vec![2]);

    assert_eq!(listener.invocations.load(Ordering::SeqCst), 1);
    let seen = listener.last.lock().unwrap().clone().unwrap();
    assert_eq!(seen.status, ExitStatus::Completed);

    // The terminal execution is persisted under its run id.
    let stored = repository
        .load("import-accounts", 1)
        .await
        .unwrap()
        .expect("persisted run");
    assert_eq!(stored.status, ExitStatus::Completed);
}

#[tokio::test]
async fn sink_failure_on_second_flush_fails_the_job() {
    // 15 records, chunk 10, flush #2 rejected: the first 10 stay
    // committed, the trailing 5 are never written.
    let dir = tempdir().unwrap();
    let repository: Arc<dyn JobRepository> =
        Arc::new(SledJobRepository::open(dir.path()).expect("open sled"));
    let capture = SinkCapture::default();
    let listener = Arc::new(ListenerSpy::default());

    let step = step_with(
        MockSource::new((1..=15).map(numbered).collect()),
        Arc::new(Identity),
        MockSink::failing_on(&capture, 2),
        10,
    );
    let job = Job::builder("import-items")
        .step(step)
        .listener(listener.clone())
        .build()
        .unwrap();

    let execution = executor::run(job, repository).await.unwrap();

    assert_eq!(execution.status, ExitStatus::Failed);
    assert_eq!(execution.steps[0].status, ExitStatus::Failed);
    assert_eq!(execution.steps[0].records_written, 10);
    assert_eq!(capture.flush_sizes(), vec![10]);

    assert_eq!(listener.invocations.load(Ordering::SeqCst), 1);
    let seen = listener.last.lock().unwrap().clone().unwrap();
    assert_eq!(seen.status, ExitStatus::Failed);
}

#[tokio::test]
async fn failed_step_halts_remaining_steps() {
    let dir = tempdir().unwrap();
    let repository: Arc<dyn JobRepository> =
        Arc::new(SledJobRepository::open(dir.path()).expect("open sled"));
    let first_capture = SinkCapture::default();
    let second_capture = SinkCapture::default();

    let failing = Step::new(
        "broken",
        Box::new(MockSource::failing_after(Vec::new(), 0)),
        Arc::new(Identity),
        Box::new(MockSink::new(&first_capture)),
        10,
    )
    .unwrap();
    let never_run = Step::new(
        "follow-up",
        Box::new(MockSource::new(vec![numbered(1)])),
        Arc::new(Identity),
        Box::new(MockSink::new(&second_capture)),
        10,
    )
    .unwrap();

    let job = Job::builder("two-steps")
        .step(failing)
        .step(never_run)
        .build()
        .unwrap();
    let execution = executor::run(job, repository).await.unwrap();

    assert_eq!(execution.status, ExitStatus::Failed);
    assert_eq!(execution.steps.len(), 1, "second step never started");
    assert!(second_capture.flush_sizes().is_empty());
}

#[tokio::test]
async fn reruns_get_fresh_independent_run_ids() {
    let dir = tempdir().unwrap();
    let repository: Arc<dyn JobRepository> =
        Arc::new(SledJobRepository::open(dir.path()).expect("open sled"));

    for expected_run in 1..=3u64 {
        let capture = SinkCapture::default();
        let step = step_with(
            MockSource::new((1..=4).map(numbered).collect()),
            Arc::new(Identity),
            MockSink::new(&capture),
            2,
        );
        let job = Job::builder("repeat").step(step).build().unwrap();
        let execution = executor::run(job, repository.clone()).await.unwrap();
        assert_eq!(execution.run_id, expected_run);
        assert_eq!(execution.status, ExitStatus::Completed);
    }

    let runs = repository.list_runs("repeat").await.unwrap();
    assert_eq!(runs.len(), 3);
}

// Repository handing out a constant id, to provoke the collision check.
struct StuckRepository {
    inner: SledJobRepository,
}

#[async_trait]
impl JobRepository for StuckRepository {
    async fn next_run_id(&self, _job: &str) -> Result<u64, engine_core::error::RepositoryError> {
        Ok(7)
    }

    async fn save(
        &self,
        execution: &JobExecution,
    ) -> Result<(), engine_core::error::RepositoryError> {
        self.inner.save(execution).await
    }

    async fn load(
        &self,
        job: &str,
        run_id: u64,
    ) -> Result<Option<JobExecution>, engine_core::error::RepositoryError> {
        self.inner.load(job, run_id).await
    }

    async fn list_runs(
        &self,
        job: &str,
    ) -> Result<Vec<JobExecution>, engine_core::error::RepositoryError> {
        self.inner.list_runs(job).await
    }
}

#[tokio::test]
async fn duplicate_run_id_is_a_config_error() {
    let dir = tempdir().unwrap();
    let repository = Arc::new(StuckRepository {
        inner: SledJobRepository::open(dir.path()).expect("open sled"),
    });

    let make_job = |capture: &SinkCapture| {
        let step = step_with(
            MockSource::new(vec![numbered(1)]),
            Arc::new(Identity),
            MockSink::new(capture),
            10,
        );
        Job::builder("stuck").step(step).build().unwrap()
    };

    let capture = SinkCapture::default();
    executor::run(make_job(&capture), repository.clone())
        .await
        .expect("first run with id 7 succeeds");

    let capture = SinkCapture::default();
    let err = executor::run(make_job(&capture), repository)
        .await
        .expect_err("second run must collide");
    assert!(matches!(
        err,
        EngineError::Config(ConfigError::DuplicateRunId { run_id: 7, .. })
    ));
    // The colliding run never reached a step.
    assert!(capture.flush_sizes().is_empty());
}
