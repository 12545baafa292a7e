mod app_config;
mod credentials;

pub use app_config::{
    AppConfig, ServerConfig, DEFAULT_API_VERSION, DEFAULT_DOWNLOAD_DIR, DEFAULT_INPUT_DIR,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};
pub use credentials::{mask_secret, ServiceCredentials};
