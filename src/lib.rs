//! Vesper Gateway - session gateway for voice assistant clients
//!
//! This library provides the core functionality of the gateway:
//! - Per-connection session orchestration over a duplex event channel
//! - Hotword sensor relay (record-enable broadcast)
//! - Natural-language understanding (per-session intent model)
//! - Speech recognition via pluggable STT providers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Clients                          │
//! │   Hotword sensors   │   User frontends (query/ASR)  │
//! └────────────────────┬────────────────────────────────┘
//!                      │  one WebSocket per client
//! ┌────────────────────▼────────────────────────────────┐
//! │                Vesper Gateway                        │
//! │   Session Orchestrator │ Peer Hub │ NLU │ ASR/STT   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │             STT providers (HTTP)                     │
//! │           Whisper  │  Deepgram                       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod events;
pub mod nlu;
pub mod session;
pub mod voice;

pub use capabilities::Capabilities;
pub use config::Config;
pub use error::{Error, ErrorReport, Result};
pub use events::{ClientEvent, SENSOR_KIND, ServerEvent};
pub use nlu::{IntentModel, Understanding, UnderstandingEngine};
pub use session::{PeerHub, Session, SessionContext, SessionMode};
pub use voice::{Recognizer, SpeechToText, Transcriber};
