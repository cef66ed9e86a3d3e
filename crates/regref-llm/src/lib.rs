use thiserror::Error;

pub mod client;
pub mod config_file;
pub mod normalizer;
pub mod oneshot;

pub use client::{ChatClient, LlmConfig};
pub use config_file::{ConfigFile, LlmFileConfig, config_path, load_config};
pub use normalizer::LlmNormalizer;
pub use oneshot::extract_oneshot;

use regref_core::NormalizeError;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("no API key configured (set the key env var or the config file)")]
    MissingApiKey,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("normalization error: {0}")]
    Normalize(#[from] NormalizeError),
}
