//! Shared test utilities

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use vesper_gateway::config::{ApiKeys, Language, SpeechConfig};
use vesper_gateway::{PeerHub, ServerEvent, Session, SessionContext, SessionMode};

/// Intent model artifact used by user-mode tests
pub const MODEL_JSON: &str = r#"{
    "intents": [
        {"name": "lights.on", "utterances": ["turn on the light", "lights on"]},
        {"name": "greeting.hello", "utterances": ["hello there", "hi"]}
    ]
}"#;

/// Write an intent model artifact, returning the guard that keeps it alive
#[must_use]
pub fn write_model(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("failed to create model file");
    file.write_all(json.as_bytes()).expect("failed to write model file");
    file
}

/// Build a shared session context over the given hub
#[must_use]
pub fn test_context(
    hub: Arc<PeerHub>,
    speech: SpeechConfig,
    model_path: PathBuf,
) -> Arc<SessionContext> {
    Arc::new(SessionContext {
        hub,
        speech,
        api_keys: ApiKeys::default(),
        model_path,
        language: Language::default(),
    })
}

/// Connect a session: register it with the hub and return it together with
/// its outbound receiver and ready signal
pub async fn connect(
    ctx: &Arc<SessionContext>,
    id: &str,
) -> (
    Session,
    mpsc::Receiver<ServerEvent>,
    oneshot::Receiver<SessionMode>,
) {
    let (tx, rx) = mpsc::channel(32);
    ctx.hub.register(id, tx.clone()).await;
    let (session, ready) = Session::new(id, Arc::clone(ctx), tx);
    (session, rx, ready)
}

/// Receive the next outbound event within a bounded wait
pub async fn next_event(rx: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("outbound channel closed")
}
