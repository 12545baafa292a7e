//! podcast-gen - client for an asynchronous podcast generation service
//!
//! This crate creates podcast generations on a remote speech service, polls
//! them to completion, downloads the resulting audio and manages temporary
//! content files. It can also run many generation jobs at once behind a
//! small HTTP API.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the job state machine, and errors
//! - **Application**: Use cases, the job orchestrator and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (HTTP service client, downloader, config file)
//! - **CLI**: Command-line interface, presentation, logging and the job server

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
