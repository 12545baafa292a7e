//! Create a generation, wait for it and read it back
//!
//! Shared by the one-shot command and the job orchestrator, which differ
//! only in how they report progress and what they do with the result.

use std::sync::atomic::AtomicBool;

use thiserror::Error;

use crate::domain::generation::{GenerationRequest, GenerationResource, OperationStatus};

use super::polling::{poll_until_terminal, PollOutcome, PollSettings};
use super::ports::{ApiError, GenerationApi};

/// Why a run stopped before a terminal resource was read back
#[derive(Debug, Error)]
pub enum RunError {
    /// The service never accepted the request
    #[error("Create request failed: {0}")]
    Create(#[source] ApiError),

    /// Created, but a status check or the read-back failed
    #[error("Polling generation {id} failed: {source}")]
    Poll {
        id: String,
        #[source]
        source: ApiError,
    },

    /// Completed, but the resource was gone when read back
    #[error("Generation {0} was not found after completion")]
    Vanished(String),
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The resource as read back after it became terminal
    Finished(GenerationResource),
    /// The cancel flag was raised while waiting
    Cancelled,
    /// `max_wait` elapsed first
    TimedOut,
}

/// Progress hooks for [`create_and_wait`]
pub trait RunObserver: Send {
    /// The service accepted the request
    fn created(&mut self) {}

    /// A status check returned
    fn status(&mut self, _status: OperationStatus) {}
}

/// PUT the request under `id`, poll its operation location until terminal,
/// then GET the resource.
///
/// Without an operation location the service finished synchronously and
/// polling is skipped.
pub async fn create_and_wait<A, O>(
    api: &A,
    id: &str,
    request: &GenerationRequest,
    settings: PollSettings,
    cancel: &AtomicBool,
    observer: &mut O,
) -> Result<RunOutcome, RunError>
where
    A: GenerationApi + ?Sized,
    O: RunObserver,
{
    let created = api.create(id, request).await.map_err(RunError::Create)?;
    observer.created();

    match created.operation_location.as_deref() {
        Some(location) => {
            let outcome = poll_until_terminal(api, location, settings, cancel, |status| {
                observer.status(status)
            })
            .await
            .map_err(|source| RunError::Poll {
                id: id.to_string(),
                source,
            })?;

            match outcome {
                PollOutcome::Completed(_) => {}
                PollOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
                PollOutcome::TimedOut => return Ok(RunOutcome::TimedOut),
            }
        }
        None => tracing::debug!(id, "no operation location; skipping poll"),
    }

    api.get(id)
        .await
        .map_err(|source| RunError::Poll {
            id: id.to_string(),
            source,
        })?
        .map(RunOutcome::Finished)
        .ok_or_else(|| RunError::Vanished(id.to_string()))
}
