//! Recognition request facade
//!
//! Stateless per-call binding between a recognition payload and the session's
//! STT provider handle. All failures surface as structured errors to the
//! caller; nothing is retained between invocations.

use base64::Engine as _;
use serde::Deserialize;

use crate::voice::Transcriber;
use crate::{Error, Result};

/// Expected fields of a recognition payload
///
/// The payload is provider-defined on the wire; this is the subset the
/// binding consumes.
#[derive(Debug, Deserialize)]
struct RecognizePayload {
    /// Base64-encoded audio
    audio: String,

    /// Optional container format hint, recorded for diagnostics
    #[serde(default)]
    format: Option<String>,
}

/// Stateless recognition binding
#[derive(Debug, Clone, Copy, Default)]
pub struct Recognizer;

impl Recognizer {
    /// Create the binding
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run one recognition request against the given transcriber
    ///
    /// # Errors
    ///
    /// Returns a `recognition` error for a malformed payload and propagates
    /// `stt` errors from the provider.
    pub async fn run(
        self,
        payload: &serde_json::Value,
        transcriber: &dyn Transcriber,
    ) -> Result<String> {
        let parsed: RecognizePayload = serde_json::from_value(payload.clone())
            .map_err(|e| Error::Recognition(format!("malformed recognize payload: {e}")))?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(&parsed.audio)
            .map_err(|e| Error::Recognition(format!("audio is not valid base64: {e}")))?;

        if audio.is_empty() {
            return Err(Error::Recognition("audio payload is empty".to_string()));
        }

        tracing::debug!(
            audio_bytes = audio.len(),
            format = parsed.format.as_deref().unwrap_or("wav"),
            "dispatching recognition request"
        );

        transcriber.transcribe(&audio).await
    }
}
