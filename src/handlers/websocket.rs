use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{debug, error, info};
use tokio::sync::mpsc;
use warp::ws::{Message, WebSocket};

use crate::core::message_handler::MessageHandler;
use crate::core::server::SharedChatServer;

// Handle a WebSocket connection for its whole lifetime
pub async fn handle_ws_client(ws: WebSocket, server: SharedChatServer) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Spawn a task to forward messages from our channel to the WebSocket
    tokio::task::spawn(async move {
        let mut rx = rx;
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_tx.send(message).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Register the session; the core greets it with alias, stats and roster
    let session_id = server.connect(tx).await;
    info!("Current connections: {}", server.stats().await.total_users);

    let handler = MessageHandler::new(server.clone());

    // Handle incoming messages
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(msg) => {
                if msg.is_close() {
                    break;
                }
                // Only process text messages
                match msg.to_str() {
                    Ok(text) => handler.handle_client_message(&session_id, text).await,
                    Err(_) => debug!("Ignoring non-text frame from {}", session_id),
                }
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", session_id, e);
                break;
            }
        }
    }

    // Client disconnected
    server.disconnect(&session_id).await;
    info!("Current connections: {}", server.stats().await.total_users);
}
