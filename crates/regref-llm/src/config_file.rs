use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub llm: Option<LlmFileConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmFileConfig {
    pub api_base: Option<String>,
    pub model: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub batch_size: Option<usize>,
    pub temperature: Option<f64>,
}

/// Platform config directory path: `<config_dir>/regref/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("regref").join("config.toml"))
}

/// Load config by cascading CWD `.regref.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".regref.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let b = base.llm.unwrap_or_default();
    let o = overlay.llm.unwrap_or_default();
    ConfigFile {
        llm: Some(LlmFileConfig {
            api_base: o.api_base.or(b.api_base),
            model: o.model.or(b.model),
            api_key_env: o.api_key_env.or(b.api_key_env),
            batch_size: o.batch_size.or(b.batch_size),
            temperature: o.temperature.or(b.temperature),
        }),
    }
}
