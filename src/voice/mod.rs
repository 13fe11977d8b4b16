//! Speech recognition plumbing
//!
//! The recognizer binding and the provider handle it delegates to. Both are
//! constructed per session; neither holds cross-session state.

mod asr;
mod stt;

pub use asr::Recognizer;
pub use stt::{SpeechToText, Transcriber};
