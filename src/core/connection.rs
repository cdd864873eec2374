//! Outbound half of a client connection
//! The socket itself belongs to the transport adapter; the core only keeps the sender.

use log::{error, warn};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use warp::ws::Message;

use crate::core::message_types::ServerEvent;

/// Sender side of one WebSocket connection
#[derive(Debug, Clone)]
pub struct Connection {
    pub session_id: String,
    pub sender: mpsc::UnboundedSender<Message>,
    pub connected_at: Instant,
}

impl Connection {
    pub fn new(session_id: String, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            session_id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Send a text frame through this connection
    pub fn send_text(&self, text: &str) -> bool {
        match self.sender.send(Message::text(text)) {
            Ok(_) => true,
            Err(_) => {
                warn!("Failed to send message to session {}", self.session_id);
                false
            }
        }
    }

    /// Serialize and send a typed event
    pub fn send_event(&self, event: &ServerEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(text) => self.send_text(&text),
            Err(e) => {
                error!("Failed to serialize event for {}: {}", self.session_id, e);
                false
            }
        }
    }

    /// The adapter dropped its receiver
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn connection_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
