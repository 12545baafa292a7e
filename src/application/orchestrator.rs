//! Job orchestration
//!
//! Runs many generation jobs side by side inside one process. Each job gets
//! its own worker task and cancel flag; callers only ever see job ids and
//! snapshots.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::config::ServiceCredentials;
use crate::domain::content::ContentHints;
use crate::domain::duration::Duration;
use crate::domain::error::{ContentError, RequestError};
use crate::domain::generation::{GenerationDraft, GenerationRequest, OperationStatus};
use crate::domain::job::{FailureStage, InvalidPhaseTransition, Job, JobFailure, JobPhase};

use super::content::resolve_content;
use super::generation_run::{create_and_wait, RunError, RunObserver, RunOutcome};
use super::polling::PollSettings;
use super::ports::{ApiError, ArtifactDownloader, GenerationApi, GenerationApiProvider};

/// Errors from the job layer
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Invalid service settings: {0}")]
    Connect(#[source] ApiError),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Job {id} has no audio available (phase: {phase})")]
    ArtifactUnavailable { id: Uuid, phase: JobPhase },

    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub poll: PollSettings,
    /// Artifacts are stored here as `{job_id}.mp3`
    pub download_dir: PathBuf,
    /// How long finished jobs are kept. `None` keeps them forever.
    pub retention: Option<Duration>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            poll: PollSettings::default(),
            download_dir: PathBuf::from(crate::domain::config::DEFAULT_DOWNLOAD_DIR),
            retention: Some(Duration::default_job_retention()),
        }
    }
}

/// A request to start a job
#[derive(Debug, Clone)]
pub struct JobSubmission {
    pub credentials: ServiceCredentials,
    pub draft: GenerationDraft,
    pub hints: ContentHints,
}

struct JobEntry {
    job: Mutex<Job>,
    cancel: Arc<AtomicBool>,
    credentials: ServiceCredentials,
}

impl JobEntry {
    fn snapshot(&self) -> Job {
        self.job.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply a phase change. Rejected changes are logged and ignored.
    fn transition<F>(&self, change: F)
    where
        F: FnOnce(&mut Job) -> Result<(), InvalidPhaseTransition>,
    {
        let mut job = self.job.lock().unwrap_or_else(|e| e.into_inner());
        match change(&mut job) {
            Ok(()) => tracing::info!(job_id = %job.id(), phase = %job.phase(), "job phase changed"),
            Err(e) => tracing::debug!(job_id = %job.id(), error = %e, "phase change ignored"),
        }
    }

    fn fail(&self, stage: FailureStage, message: impl Into<String>) {
        let failure = JobFailure::new(stage, message);
        tracing::warn!(stage = %failure.stage, reason = %failure.message, "job failed");
        self.transition(|job| job.fail(failure));
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

struct Shared<P, D> {
    provider: P,
    downloader: D,
    settings: OrchestratorSettings,
    jobs: Mutex<HashMap<Uuid, Arc<JobEntry>>>,
}

/// Concurrent job orchestrator.
///
/// Cloning is cheap; all clones share the same job table.
pub struct JobOrchestrator<P, D> {
    shared: Arc<Shared<P, D>>,
}

impl<P, D> Clone for JobOrchestrator<P, D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P, D> JobOrchestrator<P, D>
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    /// Create an orchestrator with an empty job table
    pub fn new(provider: P, downloader: D, settings: OrchestratorSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                provider,
                downloader,
                settings,
                jobs: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.shared.settings
    }

    /// Validate a submission, register a job and start its worker.
    ///
    /// Validation and content resolution happen here, so a rejected
    /// submission creates no job and makes no network calls.
    pub async fn submit(&self, submission: JobSubmission) -> Result<Uuid, OrchestratorError> {
        let JobSubmission {
            credentials,
            draft,
            hints,
        } = submission;

        draft.validate()?;
        let content = resolve_content(&hints).await?;
        let request = draft.into_request(content)?;
        let api = self
            .shared
            .provider
            .connect(&credentials)
            .map_err(OrchestratorError::Connect)?;

        let id = Uuid::new_v4();
        let entry = Arc::new(JobEntry {
            job: Mutex::new(Job::new(id, request.locale.clone(), request.content.kind())),
            cancel: Arc::new(AtomicBool::new(false)),
            credentials,
        });
        self.jobs().insert(id, Arc::clone(&entry));
        tracing::info!(job_id = %id, locale = %request.locale, content = request.content.kind(), "job submitted");

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { run_job(shared, entry, api, request).await });

        Ok(id)
    }

    /// Snapshot of one job
    pub fn status(&self, id: Uuid) -> Option<Job> {
        self.entry(id).map(|entry| entry.snapshot())
    }

    /// Snapshots of all jobs, oldest first
    pub fn list(&self) -> Vec<Job> {
        let entries: Vec<Arc<JobEntry>> = self.jobs().values().cloned().collect();
        let mut jobs: Vec<Job> = entries.iter().map(|e| e.snapshot()).collect();
        jobs.sort_by_key(|job| job.created_at());
        jobs
    }

    /// Request cooperative cancellation. Returns the phase at the time of the request.
    pub fn cancel(&self, id: Uuid) -> Option<JobPhase> {
        let entry = self.entry(id)?;
        let phase = entry.snapshot().phase();
        if !phase.is_terminal() {
            entry.cancel.store(true, Ordering::SeqCst);
            tracing::info!(job_id = %id, %phase, "cancellation requested");
        }
        Some(phase)
    }

    /// Local path of a job's downloaded audio
    pub fn artifact(&self, id: Uuid) -> Result<PathBuf, OrchestratorError> {
        let job = self.status(id).ok_or(OrchestratorError::JobNotFound(id))?;
        match (job.phase(), job.artifact_path()) {
            (JobPhase::Succeeded, Some(path)) => Ok(path.clone()),
            (phase, _) => Err(OrchestratorError::ArtifactUnavailable { id, phase }),
        }
    }

    /// Delete the remote generation behind a job, using the job's own credentials
    pub async fn delete_remote(&self, id: Uuid) -> Result<(), OrchestratorError> {
        let entry = self.entry(id).ok_or(OrchestratorError::JobNotFound(id))?;
        let api = self
            .shared
            .provider
            .connect(&entry.credentials)
            .map_err(OrchestratorError::Connect)?;
        api.delete(&id.to_string()).await?;
        tracing::info!(job_id = %id, "remote generation deleted");
        Ok(())
    }

    /// Drop finished jobs older than the retention period, removing their audio files.
    ///
    /// # Returns
    /// Number of evicted jobs
    pub async fn evict_expired(&self) -> usize {
        let Some(retention) = self.shared.settings.retention else {
            return 0;
        };
        let now = Utc::now();

        let evicted: Vec<Arc<JobEntry>> = {
            let mut jobs = self.jobs();
            let expired: Vec<Uuid> = jobs
                .iter()
                .filter(|(_, entry)| {
                    let job = entry.snapshot();
                    job.is_terminal()
                        && (now - job.updated_at())
                            .to_std()
                            .is_ok_and(|age| age >= retention.as_std())
                })
                .map(|(id, _)| *id)
                .collect();
            expired.iter().filter_map(|id| jobs.remove(id)).collect()
        };

        for entry in &evicted {
            let path = entry
                .job
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clear_artifact();
            if let Some(path) = path {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove artifact");
                }
            }
        }

        if !evicted.is_empty() {
            tracing::info!(count = evicted.len(), "evicted expired jobs");
        }
        evicted.len()
    }

    /// Run [`Self::evict_expired`] periodically in the background
    pub fn spawn_sweeper(&self, every: std::time::Duration) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                this.evict_expired().await;
            }
        })
    }

    fn entry(&self, id: Uuid) -> Option<Arc<JobEntry>> {
        self.jobs().get(&id).cloned()
    }

    fn jobs(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<JobEntry>>> {
        self.shared.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Worker: create, poll, read back, download
async fn run_job<P, D>(
    shared: Arc<Shared<P, D>>,
    entry: Arc<JobEntry>,
    api: P::Api,
    request: GenerationRequest,
) where
    P: GenerationApiProvider,
    D: ArtifactDownloader,
{
    let id = entry.snapshot().id().to_string();

    if entry.is_cancelled() {
        entry.transition(|job| job.cancel(None));
        return;
    }

    entry.transition(Job::begin_creating);
    let mut observer = JobObserver { entry: &entry };
    let outcome = create_and_wait(
        &api,
        &id,
        &request,
        shared.settings.poll,
        &entry.cancel,
        &mut observer,
    )
    .await;

    let resource = match outcome {
        Ok(RunOutcome::Finished(resource)) => resource,
        Ok(RunOutcome::Cancelled) => {
            entry.transition(|job| job.cancel(None));
            return cleanup_remote(&api, &id).await;
        }
        Ok(RunOutcome::TimedOut) => {
            let waited = shared
                .settings
                .poll
                .max_wait
                .map(|d| d.to_string())
                .unwrap_or_default();
            entry.transition(|job| job.cancel(Some(format!("Timed out after {}", waited))));
            return cleanup_remote(&api, &id).await;
        }
        Err(RunError::Create(e)) => return entry.fail(FailureStage::Create, e.to_string()),
        Err(e @ (RunError::Poll { .. } | RunError::Vanished(_))) => {
            return entry.fail(FailureStage::Poll, e.to_string())
        }
    };

    match resource.status {
        OperationStatus::Succeeded => {
            let audio_url = resource.audio_url().map(str::to_string);
            let artifact = match audio_url.as_deref() {
                Some(url) => {
                    let destination = shared.settings.download_dir.join(format!("{}.mp3", id));
                    match shared.downloader.download(url, &destination).await {
                        Ok(bytes) => {
                            tracing::info!(job_id = %id, bytes, path = %destination.display(), "artifact stored");
                            Some(destination)
                        }
                        Err(e) => return entry.fail(FailureStage::Download, e.to_string()),
                    }
                }
                None => None,
            };
            entry.transition(|job| job.succeed(audio_url, artifact));
        }
        OperationStatus::Failed => entry.fail(
            FailureStage::Generation,
            resource
                .failure_reason
                .unwrap_or_else(|| "The service reported failure without a reason".to_string()),
        ),
        OperationStatus::Cancelled => {
            entry.transition(|job| job.cancel(Some("Cancelled by the service".to_string())))
        }
        status => entry.fail(
            FailureStage::Poll,
            format!("Generation {} is still {} with nothing left to poll", id, status),
        ),
    }
}

/// Moves the job to Running once the service accepted it
struct JobObserver<'a> {
    entry: &'a JobEntry,
}

impl RunObserver for JobObserver<'_> {
    fn created(&mut self) {
        self.entry.transition(Job::mark_running);
    }
}

/// Best-effort remote delete after a local cancel
async fn cleanup_remote<A: GenerationApi>(api: &A, id: &str) {
    match api.delete(id).await {
        Ok(()) => tracing::info!(job_id = %id, "remote generation cleaned up"),
        Err(e) => tracing::warn!(job_id = %id, error = %e, "remote cleanup failed; ignoring"),
    }
}
