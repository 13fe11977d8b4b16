//! Configuration management for the Vesper gateway

pub mod file;

use std::path::PathBuf;

/// Known language tags and their short codes
const LANGUAGES: &[(&str, &str)] = &[
    ("en-US", "en"),
    ("en-GB", "en"),
    ("fr-FR", "fr"),
    ("es-ES", "es"),
    ("de-DE", "de"),
];

/// Fallback language tag when none is configured
const DEFAULT_LANGUAGE: &str = "en-US";

/// Default event channel port
const DEFAULT_PORT: u16 = 1337;

/// Language selection for the understanding pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Full tag, e.g. "en-US"
    pub tag: String,
    /// Short code, e.g. "en"
    pub short: String,
}

impl Language {
    /// Resolve a language tag to its short code
    ///
    /// Unknown tags fall back to the part before the region separator, so
    /// "pt-BR" still yields "pt".
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let short = LANGUAGES
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag))
            .map_or_else(
                || {
                    tag.split(['-', '_'])
                        .next()
                        .unwrap_or(tag)
                        .to_ascii_lowercase()
                },
                |(_, s)| (*s).to_string(),
            );

        Self {
            tag: tag.to_string(),
            short,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::from_tag(DEFAULT_LANGUAGE)
    }
}

/// Vesper gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Language used by the understanding pipeline
    pub language: Language,

    /// Speech capability inputs (stt enabled/provider, tts enabled)
    pub speech: SpeechConfig,

    /// API keys for STT providers
    pub api_keys: ApiKeys,

    /// Path to the intent model artifact
    pub model_path: PathBuf,

    /// Server configuration
    pub server: ServerConfig,

    /// Path to data directory
    pub data_dir: PathBuf,
}

/// Speech capability configuration inputs
#[derive(Debug, Clone, Default)]
pub struct SpeechConfig {
    /// Enable speech-to-text
    pub stt_enabled: bool,

    /// STT provider name ("whisper" or "deepgram")
    pub stt_provider: String,

    /// Enable text-to-speech
    pub tts_enabled: bool,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the event channel listens on
    pub port: u16,
}

/// API keys for STT providers
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper transcription)
    pub openai: Option<String>,

    /// `Deepgram` API key
    pub deepgram: Option<String>,
}

impl Config {
    /// Load configuration with env > TOML file > default precedence
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();

        let language = std::env::var("VESPER_LANG")
            .ok()
            .or(fc.language)
            .map_or_else(Language::default, |tag| Language::from_tag(&tag));

        let speech = SpeechConfig {
            stt_enabled: std::env::var("VESPER_STT")
                .ok()
                .map(|v| parse_flag(&v))
                .or(fc.speech.stt_enabled)
                .unwrap_or(false),
            stt_provider: std::env::var("VESPER_STT_PROVIDER")
                .ok()
                .or(fc.speech.stt_provider)
                .unwrap_or_else(|| "whisper".to_string()),
            tts_enabled: std::env::var("VESPER_TTS")
                .ok()
                .map(|v| parse_flag(&v))
                .or(fc.speech.tts_enabled)
                .unwrap_or(false),
        };

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
            deepgram: std::env::var("DEEPGRAM_API_KEY")
                .ok()
                .or(fc.api_keys.deepgram),
        };

        let server = ServerConfig {
            port: std::env::var("VESPER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        // Data directory (~/.local/share/vesper on Linux)
        let data_dir = directories::BaseDirs::new()
            .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("vesper"));
        std::fs::create_dir_all(&data_dir).ok();

        // Intent model artifact, resolved relative to the data directory
        let model_path = std::env::var("VESPER_MODEL_PATH")
            .ok()
            .or(fc.model_path)
            .map_or_else(|| data_dir.join("intents.json"), PathBuf::from);

        Self {
            language,
            speech,
            api_keys,
            model_path,
            server,
            data_dir,
        }
    }
}

/// Parse an enable flag the way env toggles are written ("1", "true")
fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
