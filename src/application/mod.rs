//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod content;
pub mod create_generation;
pub mod generation_run;
pub mod orchestrator;
pub mod polling;
pub mod ports;

// Re-export use cases
pub use content::resolve_content;
pub use create_generation::{
    CreateGenerationCallbacks, CreateGenerationInput, CreateGenerationOutput,
    CreateGenerationUseCase, GenerationError,
};
pub use generation_run::{create_and_wait, RunError, RunObserver, RunOutcome};
pub use orchestrator::{JobOrchestrator, JobSubmission, OrchestratorError, OrchestratorSettings};
pub use polling::{poll_until_terminal, PollOutcome, PollSettings};
