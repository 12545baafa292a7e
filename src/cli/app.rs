//! Command runners

use std::process::ExitCode;

use indicatif::ProgressBar;
use thiserror::Error;

use crate::application::ports::{ApiError, ConfigStore, GenerationApi, TempFileApi};
use crate::application::{
    CreateGenerationCallbacks, CreateGenerationInput, CreateGenerationUseCase, GenerationError,
    PollSettings,
};
use crate::domain::config::{AppConfig, ServiceCredentials};
use crate::domain::duration::Duration;
use crate::domain::error::{ConfigError, DurationParseError, InvalidOptionError};
use crate::domain::generation::OperationStatus;
use crate::domain::temp_file::validate_expiry_mins;
use crate::infrastructure::{
    build_http_client, HttpDownloader, HttpGenerationApi, HttpTempFileApi, XdgConfigStore,
};

use super::args::{Cli, Commands, CreateArgs, IdArgs, PageArgs, UploadArgs};
use super::config_cmd::handle_config_command;
use super::logging::{init_logging, COMMAND_LOG_FILTER, SERVE_LOG_FILTER};
use super::presenter::{status_message, Presenter};
use super::server;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Errors surfaced by command handlers
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidOption(#[from] InvalidOptionError),

    #[error("Invalid {key}: {source}")]
    InvalidDuration {
        key: &'static str,
        #[source]
        source: DurationParseError,
    },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("{0}")]
    Unsuccessful(String),
}

impl CommandError {
    /// Usage and configuration problems exit with 2, everything else with 1
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::InvalidOption(_) | Self::InvalidDuration { .. } => {
                EXIT_USAGE_ERROR
            }
            Self::Generation(GenerationError::Request(_) | GenerationError::Content(_)) => {
                EXIT_USAGE_ERROR
            }
            Self::Api(ApiError::FileNotFound(_) | ApiError::FileTooLarge { .. }) => {
                EXIT_USAGE_ERROR
            }
            _ => EXIT_ERROR,
        }
    }
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> ExitCode {
    let filter = match cli.command {
        Commands::Serve(_) => SERVE_LOG_FILTER,
        _ => COMMAND_LOG_FILTER,
    };
    init_logging(filter);

    let mut presenter = Presenter::new();
    let result = match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            handle_config_command(action, &store, &presenter)
                .await
                .map_err(CommandError::from)
        }
        command => {
            let config = load_merged_config(cli.service.to_config(), &presenter).await;
            dispatch(command, config, &mut presenter).await
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.stop_spinner();
            presenter.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn dispatch(
    command: Commands,
    config: AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    match command {
        Commands::CreateGeneration(args) => {
            let config = config.merge(args.to_config());
            create_generation(&args, &config, presenter).await
        }
        Commands::Get(IdArgs { id }) => {
            match generation_api(&config)?.get(&id).await? {
                Some(resource) => presenter.json(&resource)?,
                None => report_absent(presenter, "Generation", &id),
            }
            Ok(())
        }
        Commands::List(page) => list_generations(&config, page, presenter).await,
        Commands::Delete(IdArgs { id }) => {
            generation_api(&config)?.delete(&id).await?;
            presenter.success(&format!("Deleted generation {}", id));
            Ok(())
        }
        Commands::UploadTempFile(args) => upload_temp_file(&config, args, presenter).await,
        Commands::ListTempFiles(page) => {
            let files = temp_file_api(&config)?.list(page.into()).await?;
            presenter.json(&files)?;
            Ok(())
        }
        Commands::GetTempFile(IdArgs { id }) => {
            match temp_file_api(&config)?.get(&id).await? {
                Some(file) => presenter.json(&file)?,
                None => report_absent(presenter, "Temp file", &id),
            }
            Ok(())
        }
        Commands::DeleteTempFile(IdArgs { id }) => {
            temp_file_api(&config)?.delete(&id).await?;
            presenter.success(&format!("Deleted temp file {}", id));
            Ok(())
        }
        Commands::Serve(args) => {
            let config = config.merge(args.to_config());
            server::serve(config).await
        }
        Commands::Config { .. } => Ok(()),
    }
}

async fn create_generation(
    args: &CreateArgs,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    let credentials = ServiceCredentials::from_config(config)?;
    let poll = poll_settings(config)?;
    let http = build_http_client()?;
    let api = HttpGenerationApi::new(http.clone(), &credentials)?;
    let use_case = CreateGenerationUseCase::new(api, HttpDownloader::new(http));
    ShutdownSignal::new(use_case.stop_flag()).setup();

    let input = CreateGenerationInput {
        draft: args.draft(),
        hints: args.hints(),
        poll,
        download_dir: args.download.then(|| config.download_dir_or_default()),
    };

    presenter.start_spinner("Creating generation...");
    let bar = presenter.spinner_handle().unwrap_or_else(ProgressBar::hidden);
    let callbacks = CreateGenerationCallbacks {
        on_created: Some({
            let bar = bar.clone();
            Box::new(move |id: &str| bar.set_message(format!("Generation {} created", id)))
        }),
        on_status: Some({
            let bar = bar.clone();
            Box::new(move |status: OperationStatus| {
                bar.set_message(status_message(status))
            })
        }),
        on_download_start: Some(Box::new(move |_url: &str| {
            bar.set_message("Downloading audio...")
        })),
    };

    let output = match use_case.execute(input, callbacks).await {
        Ok(output) => output,
        Err(e) => {
            presenter.spinner_fail("Generation did not complete");
            return Err(e.into());
        }
    };

    let status = output.resource.status;
    if output.succeeded() {
        presenter.spinner_success(&format!("Generation {}", status));
    } else {
        presenter.spinner_fail(&format!("Generation {}", status));
    }
    presenter.json(&output.resource)?;

    if let Some(path) = &output.downloaded {
        presenter.success(&format!("Audio saved to {}", path.display()));
    } else if args.download && output.succeeded() {
        presenter.warn("Generation has no audio output to download");
    }

    if output.succeeded() {
        Ok(())
    } else {
        Err(CommandError::Unsuccessful(
            output
                .resource
                .failure_reason
                .clone()
                .unwrap_or_else(|| format!("Generation ended with status {}", status)),
        ))
    }
}

async fn list_generations(
    config: &AppConfig,
    page: PageArgs,
    presenter: &Presenter,
) -> Result<(), CommandError> {
    let generations = generation_api(config)?.list(page.into()).await?;
    presenter.json(&generations)?;
    Ok(())
}

async fn upload_temp_file(
    config: &AppConfig,
    args: UploadArgs,
    presenter: &Presenter,
) -> Result<(), CommandError> {
    let expires = args.expires_after_mins.map(validate_expiry_mins).transpose()?;
    let file = temp_file_api(config)?.upload(&args.file, expires).await?;
    presenter.json(&file)?;
    Ok(())
}

/// Absent resources are a normal outcome: print `null`, note it on stderr
fn report_absent(presenter: &Presenter, kind: &str, id: &str) {
    presenter.warn(&format!("{} '{}' not found", kind, id));
    presenter.output("null");
}

fn generation_api(config: &AppConfig) -> Result<HttpGenerationApi, CommandError> {
    let credentials = ServiceCredentials::from_config(config)?;
    Ok(HttpGenerationApi::new(build_http_client()?, &credentials)?)
}

fn temp_file_api(config: &AppConfig) -> Result<HttpTempFileApi, CommandError> {
    let credentials = ServiceCredentials::from_config(config)?;
    Ok(HttpTempFileApi::new(build_http_client()?, &credentials)?)
}

/// Parse poll timing strictly; bad values are usage errors
pub fn poll_settings(config: &AppConfig) -> Result<PollSettings, CommandError> {
    let interval = parse_duration("poll_interval", config.poll_interval.as_deref())?
        .unwrap_or_else(Duration::default_poll_interval);
    let max_wait = parse_duration("max_wait", config.max_wait.as_deref())?;
    Ok(PollSettings {
        interval,
        cancel_check: Duration::default_cancel_check(),
        max_wait,
    })
}

/// Parse the finished-job retention strictly; `None` disables eviction
pub fn job_retention(config: &AppConfig) -> Result<Option<Duration>, CommandError> {
    config
        .job_retention_or_default()
        .map_err(|source| CommandError::InvalidDuration {
            key: "job_retention",
            source,
        })
}

fn parse_duration(key: &'static str, value: Option<&str>) -> Result<Option<Duration>, CommandError> {
    value
        .map(|v| {
            v.parse::<Duration>()
                .map_err(|source| CommandError::InvalidDuration { key, source })
        })
        .transpose()
}

/// Load and merge configuration: defaults < file < environment and flags
pub async fn load_merged_config(cli_config: AppConfig, presenter: &Presenter) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            presenter.warn(&format!("Ignoring config file: {}", e));
            AppConfig::empty()
        }
    };

    AppConfig::defaults().merge(file_config).merge(cli_config)
}
