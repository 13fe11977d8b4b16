//! WebSocket transport for the session event channel
//!
//! One socket per client, upgraded at `/session/{client_id}`. The socket
//! pump stays thin: frames are parsed into [`ClientEvent`]s and handed to
//! the session orchestrator in arrival order; outbound events from the
//! orchestrator, its worker tasks, and hub broadcasts all travel one mpsc
//! channel back to the socket.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::ApiState;
use crate::events::{ClientEvent, ServerEvent};
use crate::session::Session;

/// Outbound queue depth per connection
const OUTBOUND_BUFFER: usize = 32;

/// Build the WebSocket router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/session", get(ws_upgrade_anonymous))
        .route("/session/{client_id}", get(ws_upgrade))
        .with_state(state)
}

/// Handle the WebSocket upgrade request
async fn ws_upgrade(
    State(state): State<Arc<ApiState>>,
    Path(client_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, client_id))
}

/// Upgrade a connection that supplied no client id
async fn ws_upgrade_anonymous(
    State(state): State<Arc<ApiState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let client_id = uuid::Uuid::new_v4().to_string();
    ws.on_upgrade(move |socket| handle_socket(socket, state, client_id))
}

/// Drive one connection for its lifetime
async fn handle_socket(socket: WebSocket, state: Arc<ApiState>, client_id: String) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound channel; the orchestrator, its workers, and hub broadcasts
    // all write here
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);

    let connected = ServerEvent::Connected {
        session_id: client_id.clone(),
    };
    if let Ok(msg) = serde_json::to_string(&connected) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            return;
        }
    }

    tracing::info!(session_id = %client_id, "client connected");

    state.ctx.hub.register(&client_id, tx.clone()).await;

    let (mut session, ready) = Session::new(client_id.clone(), Arc::clone(&state.ctx), tx.clone());

    // Surface handshake completion for connection setup
    let ready_id = client_id.clone();
    drop(tokio::spawn(async move {
        if let Ok(mode) = ready.await {
            tracing::info!(session_id = %ready_id, mode = mode.as_str(), "session ready");
        }
    }));

    // Forward outbound events to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&event) {
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Dispatch inbound events in arrival order
    let recv_id = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    // Keepalive is transport-level, never enters the orchestrator
                    Ok(ClientEvent::Ping) => {
                        let _ = tx.send(ServerEvent::Pong).await;
                    }
                    Ok(event) => session.handle_event(event).await,
                    Err(e) => {
                        tracing::debug!(session_id = %recv_id, error = %e, "unparseable frame");
                        let _ = tx
                            .send(ServerEvent::error(crate::Error::Serialization(e).report()))
                            .await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!(session_id = %recv_id, "connection closed by client");
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either direction to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.ctx.hub.deregister(&client_id).await;
    tracing::info!(session_id = %client_id, "client disconnected");
}
