//! Poll a long-running operation until it reaches a terminal status

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Instant;

use crate::domain::duration::Duration;
use crate::domain::generation::OperationStatus;

use super::ports::{ApiError, GenerationApi};

/// Timing for a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait between two status checks
    pub interval: Duration,
    /// How often the cancel flag is checked while waiting
    pub cancel_check: Duration,
    /// Give up after this long. `None` waits indefinitely.
    pub max_wait: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::default_poll_interval(),
            cancel_check: Duration::default_cancel_check(),
            max_wait: None,
        }
    }
}

/// How a poll loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(OperationStatus),
    Cancelled,
    TimedOut,
}

/// Poll `location` until the operation is terminal.
///
/// `cancel` is checked before every status request and every
/// `cancel_check` while waiting between requests. A failing status request
/// ends the loop with that error; there are no retries here.
pub async fn poll_until_terminal<A, F>(
    api: &A,
    location: &str,
    settings: PollSettings,
    cancel: &AtomicBool,
    mut on_status: F,
) -> Result<PollOutcome, ApiError>
where
    A: GenerationApi + ?Sized,
    F: FnMut(OperationStatus),
{
    let started = Instant::now();
    let deadline = settings.max_wait.map(|d| started + d.as_std());
    let interval = settings.interval.as_std();
    let slice = settings.cancel_check.as_std().min(interval);

    loop {
        if let Some(outcome) = interrupted(cancel, deadline) {
            return Ok(outcome);
        }

        let state = api.operation_status(location).await?;
        tracing::debug!(location, status = %state.status, "polled operation");
        on_status(state.status);
        if state.status.is_terminal() {
            return Ok(PollOutcome::Completed(state.status));
        }

        let wake_at = Instant::now() + interval;
        loop {
            let now = Instant::now();
            if now >= wake_at {
                break;
            }
            tokio::time::sleep(slice.min(wake_at - now)).await;
            if let Some(outcome) = interrupted(cancel, deadline) {
                return Ok(outcome);
            }
        }
    }
}

fn interrupted(cancel: &AtomicBool, deadline: Option<Instant>) -> Option<PollOutcome> {
    if cancel.load(Ordering::SeqCst) {
        return Some(PollOutcome::Cancelled);
    }
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Some(PollOutcome::TimedOut),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::CreatedGeneration;
    use crate::domain::generation::{
        GenerationRequest, GenerationResource, OperationState, Page, PageQuery,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays a fixed status sequence, repeating the last one
    struct ScriptedStatus {
        statuses: Mutex<VecDeque<Result<OperationStatus, ApiError>>>,
        polls: Mutex<u32>,
    }

    impl ScriptedStatus {
        fn new(statuses: Vec<Result<OperationStatus, ApiError>>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                polls: Mutex::new(0),
            }
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }
    }

    #[async_trait]
    impl GenerationApi for ScriptedStatus {
        async fn create(
            &self,
            _id: &str,
            _request: &GenerationRequest,
        ) -> Result<CreatedGeneration, ApiError> {
            unimplemented!()
        }

        async fn operation_status(&self, _location: &str) -> Result<OperationState, ApiError> {
            *self.polls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            let next = if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                statuses.front().cloned().unwrap()
            };
            next.map(|status| OperationState { id: None, status })
        }

        async fn get(&self, _id: &str) -> Result<Option<GenerationResource>, ApiError> {
            unimplemented!()
        }

        async fn list(&self, _query: PageQuery) -> Result<Page<GenerationResource>, ApiError> {
            unimplemented!()
        }

        async fn delete(&self, _id: &str) -> Result<(), ApiError> {
            unimplemented!()
        }
    }

    fn fast() -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(20),
            cancel_check: Duration::from_millis(5),
            max_wait: None,
        }
    }

    #[tokio::test]
    async fn stops_at_first_terminal_status() {
        let api = ScriptedStatus::new(vec![
            Ok(OperationStatus::NotStarted),
            Ok(OperationStatus::Running),
            Ok(OperationStatus::Succeeded),
        ]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let outcome = poll_until_terminal(&api, "loc", fast(), &AtomicBool::new(false), |s| {
            sink.lock().unwrap().push(s)
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Completed(OperationStatus::Succeeded));
        assert_eq!(api.polls(), 3);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn cancel_before_first_poll_skips_request() {
        let api = ScriptedStatus::new(vec![Ok(OperationStatus::Running)]);
        let outcome = poll_until_terminal(&api, "loc", fast(), &AtomicBool::new(true), |_| {})
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Cancelled);
        assert_eq!(api.polls(), 0);
    }

    #[tokio::test]
    async fn cancel_observed_during_wait() {
        let api = Arc::new(ScriptedStatus::new(vec![Ok(OperationStatus::Running)]));
        let cancel = Arc::new(AtomicBool::new(false));
        let settings = PollSettings {
            interval: Duration::from_secs(5),
            cancel_check: Duration::from_millis(10),
            max_wait: None,
        };

        let task = {
            let api = Arc::clone(&api);
            let cancel = Arc::clone(&cancel);
            tokio::spawn(async move {
                poll_until_terminal(api.as_ref(), "loc", settings, &cancel, |_| {}).await
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let requested = std::time::Instant::now();
        cancel.store(true, Ordering::SeqCst);

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(requested.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(api.polls(), 1);
    }

    #[tokio::test]
    async fn max_wait_times_out() {
        let api = ScriptedStatus::new(vec![Ok(OperationStatus::Running)]);
        let settings = PollSettings {
            max_wait: Some(Duration::from_millis(60)),
            ..fast()
        };
        let outcome = poll_until_terminal(&api, "loc", settings, &AtomicBool::new(false), |_| {})
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert!(api.polls() >= 1);
    }

    #[tokio::test]
    async fn status_error_ends_loop() {
        let api = ScriptedStatus::new(vec![
            Ok(OperationStatus::Running),
            Err(ApiError::Remote {
                status: 500,
                body: "boom".to_string(),
            }),
        ]);
        let err = poll_until_terminal(&api, "loc", fast(), &AtomicBool::new(false), |_| {})
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(api.polls(), 2);
    }
}
