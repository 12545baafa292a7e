//! Job lifecycle state machine

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Job phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobPhase {
    #[default]
    Starting,
    Creating,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Creating => "creating",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    // Position in Starting -> Creating -> Running -> terminal
    const fn rank(&self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Creating => 1,
            Self::Running => 2,
            Self::Succeeded | Self::Failed | Self::Cancelled => 3,
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where in the lifecycle a job failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// The remote resource was never created
    Create,
    /// Created, but its status could not be followed to completion
    Poll,
    /// The service completed the generation unsuccessfully
    Generation,
    /// Generation succeeded but the artifact could not be stored
    Download,
}

impl FailureStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Poll => "poll",
            Self::Generation => "generation",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human-readable reason a job ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub stage: FailureStage,
    pub message: String,
}

impl JobFailure {
    pub fn new(stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

/// Error when a phase change would move backwards or leave a terminal phase
#[derive(Debug, Clone, Error)]
#[error("Invalid phase transition: cannot move from {current} to {target}")]
pub struct InvalidPhaseTransition {
    pub current: JobPhase,
    pub target: JobPhase,
}

/// Job entity.
/// Tracks one generation request through its lifecycle.
///
/// State machine:
///   STARTING -> CREATING (begin_creating)
///   CREATING -> RUNNING (mark_running)
///   any non-terminal -> SUCCEEDED | FAILED | CANCELLED
///
/// Phases only move forward and terminal phases are sticky.
#[derive(Debug, Clone)]
pub struct Job {
    id: Uuid,
    locale: String,
    content_kind: &'static str,
    phase: JobPhase,
    failure: Option<JobFailure>,
    cancel_reason: Option<String>,
    audio_url: Option<String>,
    artifact_path: Option<PathBuf>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job in the starting phase
    pub fn new(id: Uuid, locale: impl Into<String>, content_kind: &'static str) -> Self {
        let now = Utc::now();
        Self {
            id,
            locale: locale.into(),
            content_kind,
            phase: JobPhase::Starting,
            failure: None,
            cancel_reason: None,
            audio_url: None,
            artifact_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn content_kind(&self) -> &'static str {
        self.content_kind
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        self.failure.as_ref()
    }

    /// Last error, if any: the failure reason or why the job was cancelled
    pub fn error(&self) -> Option<String> {
        self.failure
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| self.cancel_reason.clone())
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    pub fn artifact_path(&self) -> Option<&PathBuf> {
        self.artifact_path.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last phase change
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Transition from STARTING to CREATING
    pub fn begin_creating(&mut self) -> Result<(), InvalidPhaseTransition> {
        self.advance(JobPhase::Creating)
    }

    /// Transition from CREATING to RUNNING
    pub fn mark_running(&mut self) -> Result<(), InvalidPhaseTransition> {
        self.advance(JobPhase::Running)
    }

    /// Finish successfully, recording the artifact if one was stored
    pub fn succeed(
        &mut self,
        audio_url: Option<String>,
        artifact_path: Option<PathBuf>,
    ) -> Result<(), InvalidPhaseTransition> {
        self.advance(JobPhase::Succeeded)?;
        self.audio_url = audio_url;
        self.artifact_path = artifact_path;
        Ok(())
    }

    /// Finish with a failure
    pub fn fail(&mut self, failure: JobFailure) -> Result<(), InvalidPhaseTransition> {
        self.advance(JobPhase::Failed)?;
        self.failure = Some(failure);
        Ok(())
    }

    /// Finish as cancelled, optionally noting why (e.g. a timeout)
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), InvalidPhaseTransition> {
        self.advance(JobPhase::Cancelled)?;
        self.cancel_reason = reason;
        Ok(())
    }

    /// Forget the stored artifact path (after its file was removed)
    pub fn clear_artifact(&mut self) -> Option<PathBuf> {
        self.artifact_path.take()
    }

    fn advance(&mut self, target: JobPhase) -> Result<(), InvalidPhaseTransition> {
        if self.phase.is_terminal() || target.rank() <= self.phase.rank() {
            return Err(InvalidPhaseTransition {
                current: self.phase,
                target,
            });
        }
        self.phase = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}
