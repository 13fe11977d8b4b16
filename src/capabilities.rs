//! Per-session capability flags
//!
//! Derived once when a connection classifies as a user peer and read-only for
//! the rest of the session.

use crate::config::SpeechConfig;

/// Immutable capability record for a user session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether speech-to-text is enabled
    pub stt_enabled: bool,

    /// STT provider name, present only when speech-to-text is enabled
    pub stt_provider: Option<String>,

    /// Whether text-to-speech is enabled
    pub tts_enabled: bool,
}

impl Capabilities {
    /// Derive the capability record from the speech configuration
    ///
    /// Pure: no side effects, no failure modes.
    #[must_use]
    pub fn derive(speech: &SpeechConfig) -> Self {
        Self {
            stt_enabled: speech.stt_enabled,
            stt_provider: speech
                .stt_enabled
                .then(|| speech.stt_provider.clone()),
            tts_enabled: speech.tts_enabled,
        }
    }
}
