//! Interactive job API served by `podcast-gen serve`

mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::ports::{ArtifactDownloader, GenerationApiProvider};
use crate::application::{JobOrchestrator, OrchestratorSettings};
use crate::domain::config::AppConfig;
use crate::domain::duration::Duration;
use crate::infrastructure::{build_http_client, HttpDownloader, HttpGenerationApiProvider};

use super::app::{job_retention, poll_settings, CommandError};
use super::signals::shutdown_requested;

pub use error::{AppError, AppResult, ErrorResponse};
pub use handlers::{
    CancelResponse, ContentRequest, DeleteResponse, InputFiles, JobCreated, JobRequest, JobView,
};

/// State shared by all handlers
pub struct ServerState<P, D> {
    pub orchestrator: JobOrchestrator<P, D>,
    /// Server-side defaults: credentials, input directory
    pub config: Arc<AppConfig>,
}

impl<P, D> Clone for ServerState<P, D> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<P, D> ServerState<P, D> {
    pub fn new(orchestrator: JobOrchestrator<P, D>, config: AppConfig) -> Self {
        Self {
            orchestrator,
            config: Arc::new(config),
        }
    }
}

/// Build the job API router
pub fn router<P, D>(state: ServerState<P, D>) -> Router
where
    P: GenerationApiProvider + 'static,
    D: ArtifactDownloader + 'static,
{
    Router::new()
        .route("/api/input-files", get(handlers::list_input_files::<P, D>))
        .route(
            "/api/jobs",
            get(handlers::list_jobs::<P, D>).post(handlers::submit_job::<P, D>).layer(
                DefaultBodyLimit::max(handlers::SUBMIT_BODY_LIMIT),
            ),
        )
        .route("/api/jobs/:id", get(handlers::job_status::<P, D>))
        .route("/api/jobs/:id/cancel", post(handlers::cancel_job::<P, D>))
        .route("/api/jobs/:id/audio", get(handlers::download_audio::<P, D>))
        .route(
            "/api/jobs/:id/generation",
            delete(handlers::delete_generation::<P, D>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// How often expired jobs are swept: a tenth of the retention, between 1s and 5 minutes
pub fn sweep_interval(retention: Duration) -> std::time::Duration {
    let tenth = retention.as_std() / 10;
    tenth.clamp(
        std::time::Duration::from_secs(1),
        std::time::Duration::from_secs(300),
    )
}

/// Bind and serve until Ctrl-C or SIGTERM
pub async fn serve(config: AppConfig) -> Result<(), CommandError> {
    let settings = OrchestratorSettings {
        poll: poll_settings(&config)?,
        download_dir: config.download_dir_or_default(),
        retention: job_retention(&config)?,
    };
    let http = build_http_client()?;
    let orchestrator = JobOrchestrator::new(
        HttpGenerationApiProvider::new(http.clone()),
        HttpDownloader::new(http),
        settings,
    );
    let sweeper = orchestrator
        .settings()
        .retention
        .map(|retention| orchestrator.spawn_sweeper(sweep_interval(retention)));

    let addr = format!(
        "{}:{}",
        config.server_host_or_default(),
        config.server_port_or_default()
    );
    let state = ServerState::new(orchestrator, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_requested())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    Ok(())
}
