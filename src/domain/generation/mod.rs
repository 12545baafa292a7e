//! Podcast generation domain

mod options;
mod request;
mod resource;

pub use options::{GenderPreference, HostKind, LengthKind, StyleKind};
pub use request::{
    parse_speaker_names, validate_locale, GenerationDraft, GenerationRequest, ScriptOptions,
    VoiceOptions,
};
pub use resource::{
    GenerationOutput, GenerationResource, OperationState, OperationStatus, Page, PageQuery,
};
