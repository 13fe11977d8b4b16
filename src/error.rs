//! Error types for the Vesper gateway

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Vesper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Vesper gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Intent model loading or state error
    #[error("model error: {0}")]
    Model(String),

    /// Understanding pipeline infrastructure error
    #[error("nlu error: {0}")]
    Nlu(String),

    /// Speech-to-text provider error
    #[error("STT error: {0}")]
    Stt(String),

    /// Recognition request error (malformed payload, decode failure)
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Requested operation needs a capability the session does not have
    #[error("capability error: {0}")]
    Capability(String),

    /// Event channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Stable kind string used on the wire for failure propagation
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Model(_) => "model",
            Self::Nlu(_) => "nlu",
            Self::Stt(_) => "stt",
            Self::Recognition(_) => "recognition",
            Self::Capability(_) => "capability",
            Self::Channel(_) => "channel",
            Self::Io(_) => "io",
            Self::Http(_) => "http",
            Self::Serialization(_) => "serialization",
            Self::Toml(_) => "toml",
        }
    }

    /// Convert into the structured `{kind, message}` report delivered to peers
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Structured failure value propagated through every asynchronous boundary
///
/// Every failure surfaced to a connected peer takes this shape, regardless of
/// which subsystem produced it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    /// Stable failure category (e.g. `"model"`, `"capability"`)
    pub kind: String,
    /// Human-readable description
    pub message: String,
}
