//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::config::{AppConfig, ServerConfig};
use crate::domain::content::ContentHints;
use crate::domain::generation::{
    parse_speaker_names, GenderPreference, GenerationDraft, HostKind, LengthKind, PageQuery,
    ScriptOptions, StyleKind, VoiceOptions,
};

/// podcast-gen - Generate podcasts with a remote speech service
#[derive(Parser, Debug)]
#[command(name = "podcast-gen")]
#[command(version)]
#[command(about = "Create, inspect and download podcast generations from a speech service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Service region (e.g. eastus), or a full http(s) endpoint
    #[arg(long, global = true, env = "SPEECH_REGION", value_name = "REGION")]
    pub region: Option<String>,

    /// Subscription key for the service
    #[arg(
        long = "sub-key",
        global = true,
        env = "SPEECH_SUBSCRIPTION_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub subscription_key: Option<String>,

    /// API version sent with every request
    #[arg(long, global = true, env = "SPEECH_API_VERSION", value_name = "VERSION")]
    pub api_version: Option<String>,
}

impl ServiceArgs {
    /// Config layer contributed by flags and environment
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            region: self.region.clone().filter(|s| !s.trim().is_empty()),
            subscription_key: self.subscription_key.clone().filter(|s| !s.trim().is_empty()),
            api_version: self.api_version.clone().filter(|s| !s.trim().is_empty()),
            ..Default::default()
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a generation, wait until it finishes and print the result
    #[command(name = "create_generation_and_wait_until_terminated")]
    CreateGeneration(CreateArgs),

    /// Get a generation by id
    #[command(name = "get")]
    Get(IdArgs),

    /// List generations
    #[command(name = "list")]
    List(PageArgs),

    /// Delete a generation by id
    #[command(name = "delete")]
    Delete(IdArgs),

    /// Upload a local file as a temporary file
    #[command(name = "upload_temp_file")]
    UploadTempFile(UploadArgs),

    /// List temporary files
    #[command(name = "list_temp_files")]
    ListTempFiles(PageArgs),

    /// Get a temporary file by id
    #[command(name = "get_temp_file")]
    GetTempFile(IdArgs),

    /// Delete a temporary file by id
    #[command(name = "delete_temp_file")]
    DeleteTempFile(IdArgs),

    /// Run the interactive job server
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Manage configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for creating a generation
#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Target locale (e.g. en-US)
    #[arg(long, value_name = "LOCALE")]
    pub locale: String,

    /// Publicly reachable URL of the source content
    #[arg(long, value_name = "URL")]
    pub content_url: Option<String>,

    /// Id of a previously uploaded temporary file
    #[arg(long, value_name = "ID")]
    pub temp_file_id: Option<String>,

    /// Local .txt or .pdf file sent inline
    #[arg(long, value_name = "PATH")]
    pub text_file: Option<PathBuf>,

    /// Local .txt or .pdf file sent base64 encoded
    #[arg(long, value_name = "PATH")]
    pub base64_file: Option<PathBuf>,

    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Number of hosts (OneHost, TwoHosts)
    #[arg(long)]
    pub host: Option<HostKind>,

    /// Script length (VeryShort, Short, Medium, Long, VeryLong)
    #[arg(long)]
    pub length: Option<LengthKind>,

    /// Script style (Default, Professional, Casual)
    #[arg(long)]
    pub style: Option<StyleKind>,

    /// Extra instructions for script generation
    #[arg(long)]
    pub additional_instructions: Option<String>,

    /// Voice name to use
    #[arg(long)]
    pub voice_name: Option<String>,

    /// Preferred voice gender (Female, Male)
    #[arg(long)]
    pub gender_preference: Option<GenderPreference>,

    /// Comma separated speaker names for multi-talker voices
    #[arg(long, value_name = "NAMES")]
    pub speakers: Option<String>,

    /// Download the audio artifact when the generation succeeds
    #[arg(long)]
    pub download: bool,

    /// Directory for downloaded audio
    #[arg(long, value_name = "DIR", requires = "download")]
    pub download_dir: Option<PathBuf>,

    /// Wait between status polls (e.g. 5s)
    #[arg(long, value_name = "TIME")]
    pub poll_interval: Option<String>,

    /// Give up waiting after this long (e.g. 30m)
    #[arg(long, value_name = "TIME")]
    pub max_wait: Option<String>,
}

impl CreateArgs {
    pub fn hints(&self) -> ContentHints {
        ContentHints {
            remote_url: self.content_url.clone(),
            temp_file_id: self.temp_file_id.clone(),
            file_path: self.text_file.clone(),
            base64_file_path: self.base64_file.clone(),
        }
    }

    pub fn draft(&self) -> GenerationDraft {
        GenerationDraft {
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            locale: Some(self.locale.clone()),
            host: self.host,
            script: ScriptOptions {
                additional_instructions: self.additional_instructions.clone(),
                length: self.length,
                style: self.style,
            },
            voice: VoiceOptions {
                voice_name: self.voice_name.clone(),
                gender_preference: self.gender_preference,
                multi_talker_speaker_names: self
                    .speakers
                    .as_deref()
                    .map(parse_speaker_names)
                    .unwrap_or_default(),
            },
        }
    }

    /// Config layer contributed by this command's flags
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            poll_interval: self.poll_interval.clone(),
            max_wait: self.max_wait.clone(),
            download_dir: self
                .download_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            ..Default::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    /// Resource id
    #[arg(long)]
    pub id: String,
}

/// Paging options for list commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PageArgs {
    #[arg(long)]
    pub top: Option<u32>,

    #[arg(long)]
    pub skip: Option<u32>,

    #[arg(long)]
    pub max_page_size: Option<u32>,
}

impl From<PageArgs> for PageQuery {
    fn from(args: PageArgs) -> Self {
        PageQuery {
            top: args.top,
            skip: args.skip,
            max_page_size: args.max_page_size,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Local file to upload
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Minutes until the service deletes the file (1-1440)
    #[arg(long, value_name = "MINUTES")]
    pub expires_after_mins: Option<u32>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn to_config(&self) -> AppConfig {
        let server = (self.host.is_some() || self.port.is_some()).then(|| ServerConfig {
            host: self.host.clone(),
            port: self.port,
        });
        AppConfig {
            server,
            ..Default::default()
        }
    }
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "region",
    "subscription_key",
    "api_version",
    "poll_interval",
    "max_wait",
    "download_dir",
    "input_dir",
    "job_retention",
    "server.host",
    "server.port",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
