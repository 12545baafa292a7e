//! Job domain

mod lifecycle;

pub use lifecycle::{FailureStage, InvalidPhaseTransition, Job, JobFailure, JobPhase};
