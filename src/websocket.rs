use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::Response,
};
use axum::extract::ws::WebSocket;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tracing::{error, info};

use crate::handlers;
use crate::session;
use crate::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_uid = state.generate_client_uid();
    info!("New WebSocket connection: {}", client_uid);

    session::create_session(&state, &client_uid);

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    // Controller events (including debounced dispatch results that arrive
    // long after the triggering message) are funneled through one channel
    let forward = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if ws_sender.send(Message::Text(message)).await.is_err() {
                break;
            }
        }
    });

    // Initial messages: session snapshot, then the language list
    let ready = {
        let session = state.sessions.get(&client_uid);
        let session = session.as_deref();
        json!({
            "type": "session-ready",
            "client_uid": client_uid,
            "from_lang": session.map(|s| s.from_lang.clone()),
            "to_lang": session.map(|s| s.to_lang.clone()),
        })
    };
    if tx.send(ready.to_string()).is_err() {
        error!("Failed to queue session-ready for {}", client_uid);
    }
    handlers::send_languages(&state, &tx).await;

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = handlers::handle_message(&state, &client_uid, &text, &tx).await {
                    error!("Error handling message: {}", e);
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", client_uid);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup: drop the session and whatever dispatch is still pending
    session::close_session(&state, &client_uid);
    drop(tx);
    forward.abort();

    info!("Cleaned up client {}", client_uid);
}
