//! TOML configuration file loading
//!
//! Supports `~/.config/vesper/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VesperConfigFile {
    /// Language tag (e.g. "en-US")
    #[serde(default)]
    pub language: Option<String>,

    /// Path to the intent model artifact
    #[serde(default)]
    pub model_path: Option<String>,

    /// Speech capability configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// API keys for STT providers
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Speech capability configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// Enable speech-to-text
    pub stt_enabled: Option<bool>,

    /// STT provider name ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// Enable text-to-speech
    pub tts_enabled: Option<bool>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Event channel port
    pub port: Option<u16>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VesperConfigFile::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config_file() -> VesperConfigFile {
    let Some(path) = config_file_path() else {
        return VesperConfigFile::default();
    };

    if !path.exists() {
        return VesperConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VesperConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VesperConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/vesper/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vesper").join("config.toml"))
}
