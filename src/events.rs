//! Wire event vocabulary for the session channel
//!
//! Every frame on the duplex channel is a JSON object with a snake_case
//! `type` tag. Inbound events belong to a mode-dependent vocabulary enforced
//! by the session orchestrator; `ping` is answered at the transport layer and
//! never reaches the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::ErrorReport;

/// Classification payload that marks a connection as a hotword sensor peer
pub const SENSOR_KIND: &str = "hotword-node";

/// Incoming event from a connected client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// First event on a connection; names the peer kind
    Classify { kind: String },
    /// Hotword detection report (sensor peers only)
    Detect { hotword: String },
    /// Natural-language query (user peers only)
    Query { client: String, value: String },
    /// Speech recognition request (user peers, STT enabled)
    ///
    /// The payload shape is provider-defined; remaining fields are captured
    /// verbatim and handed to the recognizer binding.
    Recognize {
        #[serde(flatten)]
        payload: serde_json::Value,
    },
    /// Keepalive
    Ping,
}

impl ClientEvent {
    /// Event name for diagnostics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Classify { .. } => "classify",
            Self::Detect { .. } => "detect",
            Self::Query { .. } => "query",
            Self::Recognize { .. } => "recognize",
            Self::Ping => "ping",
        }
    }
}

/// Outgoing event to a connected client
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Connection established
    Connected { session_id: String },
    /// Classification handshake complete; effective capability summary
    Ready { mode: String, stt: bool, tts: bool },
    /// Interaction feedback, emitted before query processing starts
    Typing { active: bool },
    /// Broadcast to all other peers when a sensor reports a hotword
    RecordEnable,
    /// Transcript produced by a recognition request
    Recognized { text: String },
    /// Result of the understanding pipeline for a query
    ///
    /// `intent` is absent when no intent matched, which is a normal outcome.
    Understood {
        intent: Option<String>,
        confidence: f64,
    },
    /// Structured failure report, delivered to the originating session only
    Error { kind: String, message: String },
    /// Keepalive response
    Pong,
}

impl ServerEvent {
    /// Build an error event from a structured report
    #[must_use]
    pub fn error(report: ErrorReport) -> Self {
        Self::Error {
            kind: report.kind,
            message: report.message,
        }
    }
}
