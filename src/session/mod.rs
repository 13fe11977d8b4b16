//! Session orchestration for the event channel
//!
//! One [`Session`] exists per connected client. The first event on a
//! connection classifies it as a hotword sensor peer or a user peer; the
//! transition is one-way and the two modes have disjoint event vocabularies,
//! enforced at dispatch time. Sensor peers relay detections as a
//! record-enable broadcast to every other peer. User peers own their
//! understanding engine and, when speech-to-text is available, a recognizer
//! plus provider handle; both are released when the session is dropped.
//!
//! Dispatch never blocks: model load and query processing run on a dedicated
//! worker task per user session, recognition on per-call spawned tasks.
//! Failures are converted to structured `{kind, message}` reports delivered
//! to the originating session only.

mod hub;

pub use hub::PeerHub;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::Error;
use crate::capabilities::Capabilities;
use crate::config::{ApiKeys, Config, Language, SpeechConfig};
use crate::error::ErrorReport;
use crate::events::{ClientEvent, SENSOR_KIND, ServerEvent};
use crate::nlu::{Understanding, UnderstandingEngine};
use crate::voice::{Recognizer, SpeechToText};

/// Role a connection settles into on its first event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Connected, classification event not yet received
    Unclassified,
    /// Hotword detection relay
    Sensor,
    /// Natural-language queries and optional speech recognition
    User,
}

impl SessionMode {
    /// Wire/log representation of the mode
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unclassified => "unclassified",
            Self::Sensor => "sensor",
            Self::User => "user",
        }
    }
}

/// Session-independent inputs shared by every connection
#[derive(Debug)]
pub struct SessionContext {
    /// Broadcast registry shared by all sessions
    pub hub: Arc<PeerHub>,

    /// Speech capability inputs
    pub speech: SpeechConfig,

    /// API keys for STT providers
    pub api_keys: ApiKeys,

    /// Intent model artifact path
    pub model_path: PathBuf,

    /// Language for the understanding pipeline
    pub language: Language,
}

impl SessionContext {
    /// Build the shared context from loaded configuration
    #[must_use]
    pub fn from_config(config: &Config, hub: Arc<PeerHub>) -> Self {
        Self {
            hub,
            speech: config.speech.clone(),
            api_keys: config.api_keys.clone(),
            model_path: config.model_path.clone(),
            language: config.language.clone(),
        }
    }
}

/// Engine handles owned by a user-mode session
struct UserPeer {
    capabilities: Capabilities,
    queries: mpsc::UnboundedSender<String>,
    recognizer: Option<Recognizer>,
    stt: Option<Arc<SpeechToText>>,
}

/// One session per connected client
pub struct Session {
    id: String,
    mode: SessionMode,
    ctx: Arc<SessionContext>,
    outbound: mpsc::Sender<ServerEvent>,
    user: Option<UserPeer>,
    ready: Option<oneshot::Sender<SessionMode>>,
}

impl Session {
    /// Create a session in the unclassified state
    ///
    /// The returned receiver resolves with the classified mode once the
    /// initial handshake completes; connection setup code may await it or
    /// drop it.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        ctx: Arc<SessionContext>,
        outbound: mpsc::Sender<ServerEvent>,
    ) -> (Self, oneshot::Receiver<SessionMode>) {
        let (ready_tx, ready_rx) = oneshot::channel();
        (
            Self {
                id: id.into(),
                mode: SessionMode::Unclassified,
                ctx,
                outbound,
                user: None,
                ready: Some(ready_tx),
            },
            ready_rx,
        )
    }

    /// Opaque client identifier supplied by the channel
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current session mode
    #[must_use]
    pub const fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Dispatch one inbound event according to the session mode
    ///
    /// Events outside the current mode's vocabulary are logged and dropped;
    /// nothing here can fail the dispatch loop.
    pub async fn handle_event(&mut self, event: ClientEvent) {
        match (self.mode, event) {
            (SessionMode::Unclassified, ClientEvent::Classify { kind }) => {
                self.classify(&kind).await;
            }
            (SessionMode::Unclassified, other) => {
                tracing::debug!(
                    session_id = %self.id,
                    event = other.name(),
                    "event before classification ignored"
                );
            }
            (SessionMode::Sensor, ClientEvent::Detect { hotword }) => {
                self.relay_detection(&hotword).await;
            }
            (SessionMode::User, ClientEvent::Query { client, value }) => {
                self.handle_query(&client, value).await;
            }
            (SessionMode::User, ClientEvent::Recognize { payload }) => {
                self.handle_recognize(payload).await;
            }
            (mode, other) => {
                tracing::debug!(
                    session_id = %self.id,
                    mode = mode.as_str(),
                    event = other.name(),
                    "out-of-vocabulary event ignored"
                );
            }
        }
    }

    /// Resolve the one-shot classification event
    ///
    /// `"hotword-node"` marks a sensor peer; anything else is a user peer.
    async fn classify(&mut self, kind: &str) {
        let mode = if kind == SENSOR_KIND {
            SessionMode::Sensor
        } else {
            SessionMode::User
        };

        tracing::info!(
            session_id = %self.id,
            kind,
            mode = mode.as_str(),
            "session classified"
        );

        if mode == SessionMode::User {
            self.init_user_peer();
        }
        self.mode = mode;

        let (stt, tts) = self
            .user
            .as_ref()
            .map_or((false, false), |u| (u.stt.is_some(), u.capabilities.tts_enabled));
        self.send(ServerEvent::Ready {
            mode: mode.as_str().to_string(),
            stt,
            tts,
        })
        .await;

        // Handshake complete; resolve the ready signal for connection setup
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(mode);
        }
    }

    /// Construct the user peer's collaborators
    fn init_user_peer(&mut self) {
        let capabilities = Capabilities::derive(&self.ctx.speech);

        // Provider init failure removes the recognition capability only;
        // the session keeps serving queries.
        let stt = capabilities.stt_provider.as_ref().and_then(|provider| {
            match SpeechToText::from_config(provider, &self.ctx.api_keys) {
                Ok(handle) => Some(Arc::new(handle)),
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.id,
                        provider,
                        error = %e,
                        "STT provider init failed, recognition disabled for this session"
                    );
                    None
                }
            }
        });
        let recognizer = stt.is_some().then(Recognizer::new);

        tracing::info!(
            session_id = %self.id,
            stt = if stt.is_some() { "enabled" } else { "disabled" },
            tts = if capabilities.tts_enabled { "enabled" } else { "disabled" },
            "user session initialized"
        );

        let queries = spawn_query_worker(
            UnderstandingEngine::new(self.ctx.language.clone()),
            self.ctx.model_path.clone(),
            self.outbound.clone(),
        );

        self.user = Some(UserPeer {
            capabilities,
            queries,
            recognizer,
            stt,
        });
    }

    /// Re-broadcast a sensor detection as record-enable to all other peers
    async fn relay_detection(&self, hotword: &str) {
        tracing::info!(session_id = %self.id, hotword, "hotword detected");

        let delivered = self
            .ctx
            .hub
            .broadcast_except(&self.id, &ServerEvent::RecordEnable)
            .await;
        tracing::debug!(
            session_id = %self.id,
            peers = delivered,
            "record-enable broadcast"
        );
    }

    /// Queue a query for the understanding pipeline
    ///
    /// Typing feedback goes out before the job is enqueued; results travel
    /// the same outbound channel, so the client always observes feedback
    /// first.
    async fn handle_query(&self, client: &str, value: String) {
        tracing::info!(session_id = %self.id, client, value = %value, "query received");

        self.send(ServerEvent::Typing { active: true }).await;

        if let Some(user) = &self.user {
            if user.queries.send(value).is_err() {
                tracing::error!(session_id = %self.id, "query worker unavailable");
                self.send(ServerEvent::error(
                    Error::Nlu("query worker unavailable".to_string()).report(),
                ))
                .await;
            }
        }
    }

    /// Run a recognition request, or reject it with a capability error
    async fn handle_recognize(&self, payload: serde_json::Value) {
        let handles = self
            .user
            .as_ref()
            .and_then(|u| u.recognizer.zip(u.stt.clone()));

        let Some((recognizer, stt)) = handles else {
            tracing::debug!(session_id = %self.id, "recognize rejected, STT unavailable");
            self.send(ServerEvent::error(
                Error::Capability("speech-to-text is disabled".to_string()).report(),
            ))
            .await;
            return;
        };

        // Runs off the dispatch task; the result is delivered to this
        // session only and discarded if the session is gone by then.
        let outbound = self.outbound.clone();
        let session_id = self.id.clone();
        drop(tokio::spawn(async move {
            let event = match recognizer.run(&payload, stt.as_ref()).await {
                Ok(text) => ServerEvent::Recognized { text },
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "recognition failed");
                    ServerEvent::error(e.report())
                }
            };
            if outbound.send(event).await.is_err() {
                tracing::debug!(
                    session_id = %session_id,
                    "session gone, recognition result discarded"
                );
            }
        }));
    }

    /// Send an event to this session's client, discarding on a closed channel
    async fn send(&self, event: ServerEvent) {
        if self.outbound.send(event).await.is_err() {
            tracing::debug!(session_id = %self.id, "outbound channel closed, event discarded");
        }
    }
}

/// Spawn the per-session query worker
///
/// The worker performs the one-shot model load, then serves queued queries in
/// arrival order. Queries received before the load completes wait in the
/// channel; after a load failure every queued and future query degrades to a
/// structured error response. The worker exits when the session drops its
/// sender or the client disconnects.
fn spawn_query_worker(
    mut engine: UnderstandingEngine,
    model_path: PathBuf,
    outbound: mpsc::Sender<ServerEvent>,
) -> mpsc::UnboundedSender<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    drop(tokio::spawn(async move {
        let load_failure: Option<ErrorReport> = match engine.load_model(&model_path).await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(error = %e, "intent model load failed, queries will degrade");
                Some(e.report())
            }
        };

        while let Some(value) = rx.recv().await {
            let event = if let Some(report) = &load_failure {
                ServerEvent::error(report.clone())
            } else {
                match engine.process(&value).await {
                    Ok(Understanding::Match { intent, confidence }) => ServerEvent::Understood {
                        intent: Some(intent),
                        confidence,
                    },
                    Ok(Understanding::NoMatch) => ServerEvent::Understood {
                        intent: None,
                        confidence: 0.0,
                    },
                    Err(e) => ServerEvent::error(e.report()),
                }
            };

            if outbound.send(event).await.is_err() {
                // session disconnected; remaining queries are moot
                break;
            }
        }
    }));

    tx
}
