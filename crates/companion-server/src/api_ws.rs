//! WebSocket transport for the character event adapter.
//!
//! Each text frame carries one event envelope. Replies go back on the same
//! socket, in the order the frames arrived.

use crate::AppState;
use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use companion_characters::OutgoingEvent;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handler for `GET /ws`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serializes an event and queues it for the socket.
async fn send_event(tx: &mpsc::Sender<String>, event: &OutgoingEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            if let Err(e) = tx.send(json).await {
                tracing::warn!("failed to queue WebSocket reply: {}", e);
            }
        }
        Err(e) => {
            tracing::error!("failed to serialize WebSocket reply: {}", e);
        }
    }
}

/// Handles the WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Bounded so a client that stops reading cannot grow memory without limit.
    let (tx, mut rx) = mpsc::channel::<String>(256);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(AxumMessage::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    tracing::debug!(store = state.characters.has_store(), "character channel opened");

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            AxumMessage::Text(text) => {
                let service = state.characters.clone();
                let frame = text.to_string();
                let reply = tokio::task::spawn_blocking(move || service.handle_frame(&frame)).await;

                match reply {
                    Ok(Some(event)) => send_event(&tx, &event).await,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!("character event task failed: {}", e);
                        send_event(&tx, &OutgoingEvent::error("internal error")).await;
                    }
                }
            }
            AxumMessage::Close(_) => break,
            _ => {}
        }
    }

    drop(tx);
    // Lets queued replies drain before the socket is dropped.
    if let Err(e) = send_task.await {
        tracing::debug!("WebSocket send task ended abnormally: {}", e);
    }
    tracing::debug!("character channel closed");
}
