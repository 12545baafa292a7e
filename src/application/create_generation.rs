//! Create a generation and wait until it is terminal

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::content::ContentHints;
use crate::domain::error::{ContentError, RequestError};
use crate::domain::generation::{GenerationDraft, GenerationResource, OperationStatus};

use super::content::resolve_content;
use super::generation_run::{create_and_wait, RunError, RunObserver, RunOutcome};
use super::polling::PollSettings;
use super::ports::{ArtifactDownloader, DownloadError, GenerationApi};

/// Errors from the create-and-wait use case
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Stopped waiting for generation {0}")]
    Interrupted(String),

    #[error("Gave up waiting for generation {0}")]
    TimedOut(String),
}

/// Input parameters for the use case
#[derive(Debug, Clone, Default)]
pub struct CreateGenerationInput {
    pub draft: GenerationDraft,
    pub hints: ContentHints,
    pub poll: PollSettings,
    /// Store the audio here (as `{id}.mp3`) once succeeded
    pub download_dir: Option<PathBuf>,
}

/// Output from the use case
#[derive(Debug, Clone)]
pub struct CreateGenerationOutput {
    /// The generation as read back after it became terminal
    pub resource: GenerationResource,
    pub downloaded: Option<PathBuf>,
}

impl CreateGenerationOutput {
    pub fn succeeded(&self) -> bool {
        self.resource.status == OperationStatus::Succeeded
    }
}

/// Callbacks for progress and status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct CreateGenerationCallbacks {
    /// Called once the service accepted the request, with the generation id
    pub on_created: Option<Box<dyn Fn(&str) + Send + Sync>>,
    /// Called after each poll
    pub on_status: Option<Box<dyn Fn(OperationStatus) + Send + Sync>>,
    /// Called when the artifact download starts
    pub on_download_start: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

/// Forwards run progress to the caller's callbacks
struct CallbackObserver<'a> {
    id: &'a str,
    callbacks: &'a CreateGenerationCallbacks,
}

impl RunObserver for CallbackObserver<'_> {
    fn created(&mut self) {
        if let Some(ref cb) = self.callbacks.on_created {
            cb(self.id);
        }
    }

    fn status(&mut self, status: OperationStatus) {
        if let Some(ref cb) = self.callbacks.on_status {
            cb(status);
        }
    }
}

/// One-shot create-and-wait use case
pub struct CreateGenerationUseCase<A, D>
where
    A: GenerationApi,
    D: ArtifactDownloader,
{
    api: A,
    downloader: D,
    stop_flag: Arc<AtomicBool>,
}

impl<A, D> CreateGenerationUseCase<A, D>
where
    A: GenerationApi,
    D: ArtifactDownloader,
{
    /// Create a new use case instance
    pub fn new(api: A, downloader: D) -> Self {
        Self {
            api,
            downloader,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the stop flag for external signal handling
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    /// Stop waiting at the next cancellation check
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Execute the workflow
    pub async fn execute(
        &self,
        input: CreateGenerationInput,
        callbacks: CreateGenerationCallbacks,
    ) -> Result<CreateGenerationOutput, GenerationError> {
        self.stop_flag.store(false, Ordering::SeqCst);

        // Everything local is checked before the first request
        input.draft.validate()?;
        let content = resolve_content(&input.hints).await?;
        let request = input.draft.into_request(content)?;

        let id = Uuid::new_v4().to_string();
        tracing::info!(%id, content = request.content.kind(), locale = %request.locale, "creating generation");

        let mut observer = CallbackObserver {
            id: &id,
            callbacks: &callbacks,
        };
        let outcome = create_and_wait(
            &self.api,
            &id,
            &request,
            input.poll,
            &self.stop_flag,
            &mut observer,
        )
        .await?;
        let resource = match outcome {
            RunOutcome::Finished(resource) => resource,
            RunOutcome::Cancelled => return Err(GenerationError::Interrupted(id)),
            RunOutcome::TimedOut => return Err(GenerationError::TimedOut(id)),
        };

        let downloaded = match (&input.download_dir, resource.status, resource.audio_url()) {
            (Some(dir), OperationStatus::Succeeded, Some(url)) => {
                if let Some(ref cb) = callbacks.on_download_start {
                    cb(url);
                }
                let destination = dir.join(format!("{}.mp3", id));
                self.downloader.download(url, &destination).await?;
                Some(destination)
            }
            _ => None,
        };

        Ok(CreateGenerationOutput {
            resource,
            downloaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ApiError, CreatedGeneration};
    use crate::domain::duration::Duration;
    use crate::domain::generation::{
        GenerationOutput, GenerationRequest, OperationState, Page, PageQuery,
    };
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    // Mock implementations for testing
    #[derive(Default)]
    struct MockApi {
        location: Option<String>,
        final_status: Option<OperationStatus>,
        created: Mutex<Vec<GenerationRequest>>,
    }

    fn resource(id: &str, status: OperationStatus) -> GenerationResource {
        serde_json::from_value(serde_json::json!({"id": id, "status": status}))
            .map(|mut r: GenerationResource| {
                if status == OperationStatus::Succeeded {
                    r.output = Some(GenerationOutput {
                        audio_file_url: Some("https://blob/audio.mp3".to_string()),
                        report_file_url: None,
                    });
                }
                r
            })
            .unwrap()
    }

    #[async_trait]
    impl GenerationApi for MockApi {
        async fn create(
            &self,
            id: &str,
            request: &GenerationRequest,
        ) -> Result<CreatedGeneration, ApiError> {
            self.created.lock().unwrap().push(request.clone());
            Ok(CreatedGeneration {
                resource: resource(id, OperationStatus::NotStarted),
                operation_location: self.location.clone(),
            })
        }

        async fn operation_status(&self, _location: &str) -> Result<OperationState, ApiError> {
            Ok(OperationState {
                id: None,
                status: self.final_status.unwrap_or(OperationStatus::Running),
            })
        }

        async fn get(&self, id: &str) -> Result<Option<GenerationResource>, ApiError> {
            Ok(Some(resource(
                id,
                self.final_status.unwrap_or(OperationStatus::Running),
            )))
        }

        async fn list(&self, _query: PageQuery) -> Result<Page<GenerationResource>, ApiError> {
            unimplemented!()
        }

        async fn delete(&self, _id: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDownloader {
        calls: Mutex<Vec<(String, PathBuf)>>,
    }

    #[async_trait]
    impl ArtifactDownloader for MockDownloader {
        async fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), destination.to_path_buf()));
            Ok(3)
        }
    }

    fn input() -> CreateGenerationInput {
        CreateGenerationInput {
            draft: GenerationDraft {
                locale: Some("en-US".to_string()),
                ..Default::default()
            },
            hints: ContentHints {
                remote_url: Some("https://blob/doc.pdf".to_string()),
                ..Default::default()
            },
            poll: PollSettings {
                interval: Duration::from_millis(10),
                cancel_check: Duration::from_millis(5),
                max_wait: None,
            },
            download_dir: None,
        }
    }

    #[tokio::test]
    async fn execute_returns_terminal_resource() {
        let api = MockApi {
            location: Some("https://service/operations/1".to_string()),
            final_status: Some(OperationStatus::Succeeded),
            ..Default::default()
        };
        let use_case = CreateGenerationUseCase::new(api, MockDownloader::default());

        let output = use_case
            .execute(input(), CreateGenerationCallbacks::default())
            .await
            .unwrap();
        assert!(output.succeeded());
        assert!(output.downloaded.is_none());
    }

    #[tokio::test]
    async fn execute_downloads_when_requested() {
        let api = MockApi {
            location: None,
            final_status: Some(OperationStatus::Succeeded),
            ..Default::default()
        };
        let use_case = CreateGenerationUseCase::new(api, MockDownloader::default());

        let input = CreateGenerationInput {
            download_dir: Some(PathBuf::from("out")),
            ..input()
        };
        let output = use_case
            .execute(input, CreateGenerationCallbacks::default())
            .await
            .unwrap();

        let path = output.downloaded.unwrap();
        assert_eq!(path.parent(), Some(Path::new("out")));
        assert_eq!(path.extension().unwrap(), "mp3");
        let calls = use_case.downloader.calls.lock().unwrap();
        assert_eq!(calls[0].0, "https://blob/audio.mp3");
    }

    #[tokio::test]
    async fn failed_generation_is_not_an_error() {
        let api = MockApi {
            location: Some("loc".to_string()),
            final_status: Some(OperationStatus::Failed),
            ..Default::default()
        };
        let use_case = CreateGenerationUseCase::new(api, MockDownloader::default());
        let input = CreateGenerationInput {
            download_dir: Some(PathBuf::from("out")),
            ..input()
        };

        let output = use_case
            .execute(input, CreateGenerationCallbacks::default())
            .await
            .unwrap();
        assert!(!output.succeeded());
        assert!(output.downloaded.is_none());
    }

    #[tokio::test]
    async fn missing_locale_fails_before_create() {
        let use_case = CreateGenerationUseCase::new(MockApi::default(), MockDownloader::default());
        let input = CreateGenerationInput {
            draft: GenerationDraft::default(),
            ..input()
        };

        let err = use_case
            .execute(input, CreateGenerationCallbacks::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Request(RequestError::MissingLocale)));
        assert!(use_case.api.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_content_fails_before_create() {
        let use_case = CreateGenerationUseCase::new(MockApi::default(), MockDownloader::default());
        let input = CreateGenerationInput {
            hints: ContentHints::default(),
            ..input()
        };

        let err = use_case
            .execute(input, CreateGenerationCallbacks::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Content(ContentError::MissingSource)));
        assert!(use_case.api.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stop_flag_interrupts_wait() {
        let api = MockApi {
            location: Some("loc".to_string()),
            final_status: None,
            ..Default::default()
        };
        let use_case = Arc::new(CreateGenerationUseCase::new(api, MockDownloader::default()));
        let stop = use_case.stop_flag();

        let input = CreateGenerationInput {
            poll: PollSettings {
                interval: Duration::from_secs(5),
                cancel_check: Duration::from_millis(10),
                max_wait: None,
            },
            ..input()
        };
        let (created_tx, created_rx) = tokio::sync::oneshot::channel::<()>();
        let created_tx = Mutex::new(Some(created_tx));
        let callbacks = CreateGenerationCallbacks {
            on_created: Some(Box::new(move |_| {
                if let Some(tx) = created_tx.lock().unwrap().take() {
                    let _ = tx.send(());
                }
            })),
            ..Default::default()
        };

        let task = {
            let use_case = Arc::clone(&use_case);
            tokio::spawn(async move { use_case.execute(input, callbacks).await })
        };
        created_rx.await.unwrap();
        stop.store(true, Ordering::SeqCst);

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, GenerationError::Interrupted(_)));
    }
}
