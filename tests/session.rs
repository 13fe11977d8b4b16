//! Session orchestration integration tests
//!
//! Exercises the orchestrator against in-memory channels, without a socket.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use vesper_gateway::config::SpeechConfig;
use vesper_gateway::{ClientEvent, PeerHub, SENSOR_KIND, ServerEvent, SessionMode};

mod common;

use common::{MODEL_JSON, connect, next_event, test_context, write_model};

fn classify(kind: &str) -> ClientEvent {
    ClientEvent::Classify {
        kind: kind.to_string(),
    }
}

fn query(value: &str) -> ClientEvent {
    ClientEvent::Query {
        client: "c1".to_string(),
        value: value.to_string(),
    }
}

#[tokio::test]
async fn first_event_determines_mode_permanently() {
    let hub = Arc::new(PeerHub::new());
    let ctx = test_context(hub, SpeechConfig::default(), PathBuf::from("/nonexistent"));
    let (mut session, mut rx, ready) = connect(&ctx, "sensor-1").await;

    session.handle_event(classify(SENSOR_KIND)).await;
    assert_eq!(session.mode(), SessionMode::Sensor);
    assert_eq!(ready.await.unwrap(), SessionMode::Sensor);
    assert_eq!(
        next_event(&mut rx).await,
        ServerEvent::Ready {
            mode: "sensor".to_string(),
            stt: false,
            tts: false,
        }
    );

    // A second classify-like event has no effect on mode and emits nothing
    session.handle_event(classify("user-1")).await;
    assert_eq!(session.mode(), SessionMode::Sensor);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn sensor_without_detect_never_broadcasts() {
    let hub = Arc::new(PeerHub::new());
    let ctx = test_context(
        Arc::clone(&hub),
        SpeechConfig::default(),
        PathBuf::from("/nonexistent"),
    );
    let (mut session, mut rx, _ready) = connect(&ctx, "sensor-1").await;

    let (peer_tx, mut peer_rx) = mpsc::channel(8);
    hub.register("peer-1", peer_tx).await;

    session.handle_event(classify(SENSOR_KIND)).await;
    let _ready_event = next_event(&mut rx).await;

    assert!(peer_rx.try_recv().is_err());
}

#[tokio::test]
async fn detect_broadcasts_once_to_others_never_to_self() {
    let hub = Arc::new(PeerHub::new());
    let ctx = test_context(
        Arc::clone(&hub),
        SpeechConfig::default(),
        PathBuf::from("/nonexistent"),
    );
    let (mut session, mut rx, _ready) = connect(&ctx, "sensor-1").await;

    let (peer_a_tx, mut peer_a_rx) = mpsc::channel(8);
    let (peer_b_tx, mut peer_b_rx) = mpsc::channel(8);
    hub.register("peer-a", peer_a_tx).await;
    hub.register("peer-b", peer_b_tx).await;

    session.handle_event(classify(SENSOR_KIND)).await;
    let _ready_event = next_event(&mut rx).await;

    session
        .handle_event(ClientEvent::Detect {
            hotword: "ok".to_string(),
        })
        .await;

    // Exactly one broadcast per peer, zero to the sensor itself
    assert_eq!(peer_a_rx.try_recv().unwrap(), ServerEvent::RecordEnable);
    assert!(peer_a_rx.try_recv().is_err());
    assert_eq!(peer_b_rx.try_recv().unwrap(), ServerEvent::RecordEnable);
    assert!(peer_b_rx.try_recv().is_err());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn user_classification_reports_capabilities() {
    let hub = Arc::new(PeerHub::new());
    let model = write_model(MODEL_JSON);
    let speech = SpeechConfig {
        stt_enabled: false,
        stt_provider: "whisper".to_string(),
        tts_enabled: true,
    };
    let ctx = test_context(hub, speech, model.path().to_path_buf());
    let (mut session, mut rx, ready) = connect(&ctx, "user-1").await;

    session.handle_event(classify("user-1")).await;
    assert_eq!(session.mode(), SessionMode::User);
    assert_eq!(ready.await.unwrap(), SessionMode::User);
    assert_eq!(
        next_event(&mut rx).await,
        ServerEvent::Ready {
            mode: "user".to_string(),
            stt: false,
            tts: true,
        }
    );
}

#[tokio::test]
async fn recognize_with_stt_disabled_is_a_capability_error() {
    let hub = Arc::new(PeerHub::new());
    let model = write_model(MODEL_JSON);
    let ctx = test_context(hub, SpeechConfig::default(), model.path().to_path_buf());
    let (mut session, mut rx, _ready) = connect(&ctx, "user-1").await;

    session.handle_event(classify("user-1")).await;
    let _ready_event = next_event(&mut rx).await;

    session
        .handle_event(ClientEvent::Recognize {
            payload: serde_json::json!({ "audio": "AAAA", "format": "wav" }),
        })
        .await;

    match next_event(&mut rx).await {
        ServerEvent::Error { kind, .. } => assert_eq!(kind, "capability"),
        other => panic!("expected capability error, got {other:?}"),
    }
}

#[tokio::test]
async fn query_gets_typing_before_result_even_when_model_load_failed() {
    let hub = Arc::new(PeerHub::new());
    let ctx = test_context(
        hub,
        SpeechConfig::default(),
        PathBuf::from("/nonexistent/intents.json"),
    );
    let (mut session, mut rx, _ready) = connect(&ctx, "user-1").await;

    session.handle_event(classify("user-1")).await;
    let _ready_event = next_event(&mut rx).await;

    session.handle_event(query("turn on the light")).await;

    assert_eq!(next_event(&mut rx).await, ServerEvent::Typing { active: true });
    match next_event(&mut rx).await {
        ServerEvent::Error { kind, .. } => assert_eq!(kind, "model"),
        other => panic!("expected model error, got {other:?}"),
    }
}

#[tokio::test]
async fn query_sent_before_load_completes_is_processed_after_it() {
    let hub = Arc::new(PeerHub::new());
    let model = write_model(MODEL_JSON);
    let ctx = test_context(hub, SpeechConfig::default(), model.path().to_path_buf());
    let (mut session, mut rx, _ready) = connect(&ctx, "user-1").await;

    // Query lands immediately after classification, racing the model load
    session.handle_event(classify("user-1")).await;
    session.handle_event(query("turn on the light")).await;

    let _ready_event = next_event(&mut rx).await;
    assert_eq!(next_event(&mut rx).await, ServerEvent::Typing { active: true });
    match next_event(&mut rx).await {
        ServerEvent::Understood { intent, confidence } => {
            assert_eq!(intent.as_deref(), Some("lights.on"));
            assert!(confidence > 0.0);
        }
        other => panic!("expected understood event, got {other:?}"),
    }
}

#[tokio::test]
async fn queries_are_processed_in_arrival_order() {
    let hub = Arc::new(PeerHub::new());
    let model = write_model(MODEL_JSON);
    let ctx = test_context(hub, SpeechConfig::default(), model.path().to_path_buf());
    let (mut session, mut rx, _ready) = connect(&ctx, "user-1").await;

    session.handle_event(classify("user-1")).await;
    let _ready_event = next_event(&mut rx).await;

    session.handle_event(query("hello there")).await;
    session.handle_event(query("turn on the light")).await;

    assert_eq!(next_event(&mut rx).await, ServerEvent::Typing { active: true });
    assert_eq!(next_event(&mut rx).await, ServerEvent::Typing { active: true });

    match next_event(&mut rx).await {
        ServerEvent::Understood { intent, .. } => {
            assert_eq!(intent.as_deref(), Some("greeting.hello"));
        }
        other => panic!("expected understood event, got {other:?}"),
    }
    match next_event(&mut rx).await {
        ServerEvent::Understood { intent, .. } => {
            assert_eq!(intent.as_deref(), Some("lights.on"));
        }
        other => panic!("expected understood event, got {other:?}"),
    }
}

#[tokio::test]
async fn unmatched_query_is_not_an_error() {
    let hub = Arc::new(PeerHub::new());
    let model = write_model(MODEL_JSON);
    let ctx = test_context(hub, SpeechConfig::default(), model.path().to_path_buf());
    let (mut session, mut rx, _ready) = connect(&ctx, "user-1").await;

    session.handle_event(classify("user-1")).await;
    let _ready_event = next_event(&mut rx).await;

    session.handle_event(query("recite some poetry backwards")).await;

    assert_eq!(next_event(&mut rx).await, ServerEvent::Typing { active: true });
    assert_eq!(
        next_event(&mut rx).await,
        ServerEvent::Understood {
            intent: None,
            confidence: 0.0,
        }
    );
}

#[tokio::test]
async fn other_modes_vocabulary_is_ignored() {
    let hub = Arc::new(PeerHub::new());
    let model = write_model(MODEL_JSON);
    let ctx = test_context(
        Arc::clone(&hub),
        SpeechConfig::default(),
        model.path().to_path_buf(),
    );

    // User session receives a sensor event: nothing is emitted
    let (mut user, mut user_rx, _r1) = connect(&ctx, "user-1").await;
    user.handle_event(classify("user-1")).await;
    let _ready_event = next_event(&mut user_rx).await;
    user.handle_event(ClientEvent::Detect {
        hotword: "ok".to_string(),
    })
    .await;
    assert!(user_rx.try_recv().is_err());

    // Sensor session receives a user event: nothing is emitted, no broadcast
    let (mut sensor, mut sensor_rx, _r2) = connect(&ctx, "sensor-1").await;
    sensor.handle_event(classify(SENSOR_KIND)).await;
    let _ready_event = next_event(&mut sensor_rx).await;
    sensor.handle_event(query("turn on the light")).await;
    assert!(sensor_rx.try_recv().is_err());
    assert!(user_rx.try_recv().is_err());
}

#[tokio::test]
async fn events_before_classification_are_not_processed() {
    let hub = Arc::new(PeerHub::new());
    let model = write_model(MODEL_JSON);
    let ctx = test_context(hub, SpeechConfig::default(), model.path().to_path_buf());
    let (mut session, mut rx, _ready) = connect(&ctx, "c1").await;

    session.handle_event(query("turn on the light")).await;
    session
        .handle_event(ClientEvent::Detect {
            hotword: "ok".to_string(),
        })
        .await;

    assert_eq!(session.mode(), SessionMode::Unclassified);
    assert!(rx.try_recv().is_err());
}
