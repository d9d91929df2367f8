//! End-to-end pipeline scenarios against a real SQLite database, with the
//! renderer and storage provider replaced by scripted doubles.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tempfile::TempDir;

use evalsync::models::{
    Evaluation, EvaluationStatus, JobState, UploadStatus, MAX_ATTEMPTS,
};
use evalsync::render::ArtifactRenderer;
use evalsync::repository::{
    run_migrations, DbPool, EvaluationRepository, IntegrationRepository, UploadQueueRepository,
};
use evalsync::schema::upload_jobs;
use evalsync::services::upload::{upload_now, Resolution, UploadWorker, WorkerConfig};
use evalsync::storage::{
    StorageError, StorageProvider, UploadOutcome, UploadRequest, PROVIDER_GOOGLE_DRIVE,
};

struct MockRenderer;

impl ArtifactRenderer for MockRenderer {
    fn render(&self, _evaluation: &Evaluation) -> anyhow::Result<Vec<u8>> {
        Ok(b"%PDF-1.4 mock".to_vec())
    }
}

/// Storage double that replays a scripted sequence of results, then keeps
/// answering with a successful upload. Records the file names it was asked
/// to store.
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<UploadOutcome, StorageError>>>,
    seen_files: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<UploadOutcome, StorageError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen_files: Mutex::new(Vec::new()),
        }
    }

    fn always_uploaded() -> Self {
        Self::new(Vec::new())
    }

    fn seen_files(&self) -> Vec<String> {
        self.seen_files.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        PROVIDER_GOOGLE_DRIVE
    }

    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadOutcome, StorageError> {
        self.seen_files
            .lock()
            .unwrap()
            .push(request.file_name.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(UploadOutcome::uploaded(
                format!("uploaded '{}'", request.file_name),
                "file-1",
                "folder-1",
            )),
        }
    }
}

struct Fixture {
    pool: DbPool,
    queue: UploadQueueRepository,
    evaluations: EvaluationRepository,
    integrations: IntegrationRepository,
    _dir: TempDir,
}

async fn setup() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("evalsync.db");
    run_migrations(&db_path.display().to_string()).await.unwrap();

    let pool = DbPool::from_path(&db_path);
    Fixture {
        queue: UploadQueueRepository::new(pool.clone()),
        evaluations: EvaluationRepository::new(pool.clone()),
        integrations: IntegrationRepository::new(pool.clone()),
        pool,
        _dir: dir,
    }
}

impl Fixture {
    fn worker(&self, provider: Arc<ScriptedProvider>) -> UploadWorker {
        UploadWorker::new(
            self.queue.clone(),
            self.evaluations.clone(),
            self.integrations.clone(),
            Arc::new(MockRenderer),
            provider,
            WorkerConfig::default(),
        )
    }

    /// Seed one org with an approved evaluation and a fully-configured
    /// integration. Returns (organization_id, evaluation_id).
    async fn seed_ready(&self) -> (i64, i64) {
        let org = self.evaluations.create_organization("Acme Corp").await.unwrap();
        let evaluation = self
            .evaluations
            .create(org, "Jane Doe", "2025-H1", EvaluationStatus::Approved)
            .await
            .unwrap();
        self.integrations
            .upsert(
                org,
                PROVIDER_GOOGLE_DRIVE,
                true,
                true,
                Some(r#"{"access_token":"token"}"#),
                Some("root-folder"),
            )
            .await
            .unwrap();
        (org, evaluation)
    }

    /// Force every job to be due immediately, sidestepping backoff delays.
    async fn make_all_due(&self) {
        let past = (chrono::Utc::now() - chrono::Duration::seconds(1)).to_rfc3339();
        let mut conn = self.pool.get().await.unwrap();
        diesel::update(upload_jobs::table)
            .set(upload_jobs::next_attempt_at.eq(Some(past)))
            .execute(&mut conn)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn happy_path_uploads_and_audits() {
    let fx = setup().await;
    let (org, evaluation) = fx.seed_ready().await;
    let provider = Arc::new(ScriptedProvider::always_uploaded());
    let worker = fx.worker(provider.clone());

    fx.queue
        .enqueue_or_requeue(org, evaluation, PROVIDER_GOOGLE_DRIVE, None)
        .await
        .unwrap();
    assert_eq!(worker.poll_once().await.unwrap(), 1);

    let job = fx
        .queue
        .get(org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.state, JobState::Succeeded);
    assert_eq!(job.attempt_count, 1);
    assert_eq!(job.last_file_id.as_deref(), Some("file-1"));
    assert_eq!(job.last_folder_id.as_deref(), Some("folder-1"));
    assert!(job.processing_started_at.is_none());

    let logs = fx.queue.logs_for_record(org, evaluation, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, UploadStatus::Uploaded);
    assert_eq!(logs[0].attempt_number, 1);

    // File named after the sanitized display name.
    assert_eq!(provider.seen_files(), vec!["Jane Doe 2025-H1.pdf"]);
}

#[tokio::test]
async fn transient_failures_then_success_on_final_attempt() {
    let fx = setup().await;
    let (org, evaluation) = fx.seed_ready().await;

    // Seven attempts die on provider-side trouble, the eighth lands.
    let script: Vec<Result<UploadOutcome, StorageError>> = (0..7)
        .map(|_| {
            Err(StorageError::Provider {
                status: 503,
                message: "backend unavailable".to_string(),
            })
        })
        .collect();
    let provider = Arc::new(ScriptedProvider::new(script));
    let worker = fx.worker(provider);

    fx.queue
        .enqueue_or_requeue(org, evaluation, PROVIDER_GOOGLE_DRIVE, None)
        .await
        .unwrap();

    for _ in 0..MAX_ATTEMPTS {
        fx.make_all_due().await;
        assert_eq!(worker.poll_once().await.unwrap(), 1);
    }

    let job = fx
        .queue
        .get(org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.state, JobState::Succeeded);
    assert_eq!(job.attempt_count, MAX_ATTEMPTS);

    let logs = fx.queue.logs_for_record(org, evaluation, 50).await.unwrap();
    assert_eq!(logs.len(), MAX_ATTEMPTS as usize);
    let failed = logs.iter().filter(|l| l.status == UploadStatus::Failed).count();
    assert_eq!(failed, 7);
    // Newest first: the final attempt is the successful one.
    assert_eq!(logs[0].status, UploadStatus::Uploaded);
    assert_eq!(logs[0].attempt_number, MAX_ATTEMPTS);
}

#[tokio::test]
async fn exhausted_attempts_fail_terminally() {
    let fx = setup().await;
    let (org, evaluation) = fx.seed_ready().await;

    let script = (0..MAX_ATTEMPTS)
        .map(|_| Ok(UploadOutcome::failed("connection reset by peer")))
        .collect();
    let worker = fx.worker(Arc::new(ScriptedProvider::new(script)));

    fx.queue
        .enqueue_or_requeue(org, evaluation, PROVIDER_GOOGLE_DRIVE, None)
        .await
        .unwrap();

    for _ in 0..MAX_ATTEMPTS {
        fx.make_all_due().await;
        assert_eq!(worker.poll_once().await.unwrap(), 1);
    }

    let job = fx
        .queue
        .get(org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert_eq!(job.attempt_count, MAX_ATTEMPTS);

    // Terminally failed: nothing further is claimed even when due.
    fx.make_all_due().await;
    assert_eq!(worker.poll_once().await.unwrap(), 0);
}

#[tokio::test]
async fn unapproved_record_skips_once() {
    let fx = setup().await;
    let org = fx.evaluations.create_organization("Acme Corp").await.unwrap();
    let evaluation = fx
        .evaluations
        .create(org, "Jane Doe", "2025-H1", EvaluationStatus::Submitted)
        .await
        .unwrap();
    // Integration fully configured; approval is what blocks.
    fx.integrations
        .upsert(
            org,
            PROVIDER_GOOGLE_DRIVE,
            true,
            true,
            Some(r#"{"access_token":"token"}"#),
            Some("root-folder"),
        )
        .await
        .unwrap();

    let worker = fx.worker(Arc::new(ScriptedProvider::always_uploaded()));
    fx.queue
        .enqueue_or_requeue(org, evaluation, PROVIDER_GOOGLE_DRIVE, None)
        .await
        .unwrap();
    assert_eq!(worker.poll_once().await.unwrap(), 1);

    let job = fx
        .queue
        .get(org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.state, JobState::Skipped);
    assert_eq!(job.attempt_count, 1);

    let logs = fx.queue.logs_for_record(org, evaluation, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, UploadStatus::Skipped);
    assert_eq!(logs[0].message, "not approved yet");
}

#[tokio::test]
async fn approval_gate_precedes_integration_gates() {
    let fx = setup().await;
    let org = fx.evaluations.create_organization("Acme Corp").await.unwrap();
    // Not approved AND no integration configured at all.
    let evaluation = fx
        .evaluations
        .create(org, "Jane Doe", "2025-H1", EvaluationStatus::Draft)
        .await
        .unwrap();

    let worker = fx.worker(Arc::new(ScriptedProvider::always_uploaded()));
    fx.queue
        .enqueue_or_requeue(org, evaluation, PROVIDER_GOOGLE_DRIVE, None)
        .await
        .unwrap();
    worker.poll_once().await.unwrap();

    let logs = fx.queue.logs_for_record(org, evaluation, 10).await.unwrap();
    assert_eq!(logs[0].message, "not approved yet");
}

#[tokio::test]
async fn tenant_mismatch_fails_terminally() {
    let fx = setup().await;
    let (org, evaluation) = fx.seed_ready().await;
    let other_org = fx.evaluations.create_organization("Intruder Inc").await.unwrap();

    let worker = fx.worker(Arc::new(ScriptedProvider::always_uploaded()));
    fx.queue
        .enqueue_or_requeue(other_org, evaluation, PROVIDER_GOOGLE_DRIVE, None)
        .await
        .unwrap();
    worker.poll_once().await.unwrap();

    let job = fx
        .queue
        .get(other_org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert_eq!(job.last_message.as_deref(), Some("tenant mismatch"));

    // The legitimate tenant's job is unaffected.
    assert!(fx
        .queue
        .get(org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn provider_skip_is_recorded_with_ids() {
    let fx = setup().await;
    let (org, evaluation) = fx.seed_ready().await;

    let script = vec![Ok(UploadOutcome {
        status: UploadStatus::Skipped,
        message: "file 'Jane Doe 2025-H1.pdf' already present".to_string(),
        file_id: Some("existing-file".to_string()),
        folder_id: Some("existing-folder".to_string()),
    })];
    let worker = fx.worker(Arc::new(ScriptedProvider::new(script)));

    fx.queue
        .enqueue_or_requeue(org, evaluation, PROVIDER_GOOGLE_DRIVE, None)
        .await
        .unwrap();
    worker.poll_once().await.unwrap();

    let job = fx
        .queue
        .get(org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.state, JobState::Skipped);
    assert_eq!(job.last_file_id.as_deref(), Some("existing-file"));
}

#[tokio::test]
async fn direct_upload_logs_attempt_zero_and_leaves_queue_alone() {
    let fx = setup().await;
    let (org, evaluation) = fx.seed_ready().await;
    let provider: Arc<dyn StorageProvider> = Arc::new(ScriptedProvider::always_uploaded());
    let renderer: Arc<dyn ArtifactRenderer> = Arc::new(MockRenderer);

    let resolution = upload_now(
        &fx.queue,
        &fx.evaluations,
        &fx.integrations,
        &renderer,
        &provider,
        org,
        evaluation,
    )
    .await
    .unwrap();
    assert!(matches!(resolution, Resolution::Uploaded { .. }));

    let logs = fx.queue.logs_for_record(org, evaluation, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, UploadStatus::Uploaded);
    assert_eq!(logs[0].attempt_number, 0);

    // No queue row was created or touched.
    assert!(fx
        .queue
        .get(org, evaluation, PROVIDER_GOOGLE_DRIVE)
        .await
        .unwrap()
        .is_none());
}
