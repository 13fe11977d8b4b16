//! Speech-to-text provider handle
//!
//! One `SpeechToText` is constructed per user session when the capability is
//! enabled, selected by provider name from configuration. The recognizer
//! binding talks to it through the [`Transcriber`] trait.

use async_trait::async_trait;

use crate::config::ApiKeys;
use crate::{Error, Result};

/// Transcribes audio to text
///
/// The seam between the recognizer binding and a concrete STT backend.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV audio bytes to text
    ///
    /// # Errors
    ///
    /// Returns an `stt` error if the provider call fails.
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// STT provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Provider {
    Whisper,
    Deepgram,
}

/// Response payload from the Whisper transcription endpoint
#[derive(serde::Deserialize)]
struct WhisperTranscript {
    text: String,
}

/// Response payload from the Deepgram listen endpoint
#[derive(serde::Deserialize)]
struct DeepgramTranscript {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// Speech-to-text provider handle for one session
#[derive(Debug)]
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: String,
    model: String,
    provider: Provider,
}

impl SpeechToText {
    /// Construct the provider handle named in the configuration
    ///
    /// # Errors
    ///
    /// Returns a `config` error for an unknown provider name or a missing
    /// API key.
    pub fn from_config(provider: &str, keys: &ApiKeys) -> Result<Self> {
        let (provider, api_key, model) = match provider {
            "whisper" => (
                Provider::Whisper,
                keys.openai.clone(),
                "whisper-1".to_string(),
            ),
            "deepgram" => (
                Provider::Deepgram,
                keys.deepgram.clone(),
                "nova-2".to_string(),
            ),
            other => {
                return Err(Error::Config(format!("unknown STT provider: {other}")));
            }
        };

        let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
            Error::Config(format!("API key required for STT provider {provider:?}"))
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            provider,
        })
    }

    async fn transcribe_whisper(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let transcript: WhisperTranscript = response.json().await?;
        tracing::info!(transcript = %transcript.text, "transcription complete");
        Ok(transcript.text)
    }

    async fn transcribe_deepgram(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let url = format!(
            "https://api.deepgram.com/v1/listen?model={}&punctuate=true",
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(audio.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let parsed: DeepgramTranscript = response.json().await?;
        let transcript = parsed
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        match self.provider {
            Provider::Whisper => self.transcribe_whisper(audio).await,
            Provider::Deepgram => self.transcribe_deepgram(audio).await,
        }
    }
}
