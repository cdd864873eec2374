//! Message router: decodes inbound frames and dispatches typed events

use log::{debug, warn};
use serde_json::Value;
use std::time::Instant;

use crate::core::message_types::ClientEvent;
use crate::core::server::{ChatState, SharedChatServer};
use crate::error::{ChatError, Result};

/// Decode one inbound text frame into a typed event.
///
/// A frame whose `type` is not a known kind yields `UnknownEventKind`; anything
/// else that does not fit the schema is `MalformedPayload`.
pub fn decode_client_event(text: &str, max_bytes: usize) -> Result<ClientEvent> {
    if text.len() > max_bytes {
        return Err(ChatError::MalformedPayload(format!(
            "payload of {} bytes exceeds limit of {}",
            text.len(),
            max_bytes
        )));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| ChatError::MalformedPayload(format!("Invalid JSON: {}", e)))?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ChatError::MalformedPayload("missing string field 'type'".to_string()))?
        .to_string();

    if !ClientEvent::KINDS.contains(&kind.as_str()) {
        return Err(ChatError::UnknownEventKind(kind));
    }

    serde_json::from_value(value)
        .map_err(|e| ChatError::MalformedPayload(format!("Invalid '{}' event: {}", kind, e)))
}

/// Apply one typed event to the state. Returns whether membership or the queue
/// changed, in which case the caller owes everyone a stats broadcast.
pub fn dispatch(
    state: &mut ChatState,
    session_id: &str,
    event: ClientEvent,
    now: Instant,
) -> Result<bool> {
    debug!("Dispatching {} from {}", event.kind(), session_id);
    match event {
        ClientEvent::FindMatch => Ok(state.request_match(session_id)),
        ClientEvent::JoinNamedRoom { room_id } => state.join_named_room(session_id, &room_id),
        ClientEvent::LeaveNamedRoom => Ok(state.leave_named_room(session_id)),
        ClientEvent::Message { message } => {
            state.route_message(session_id, &message, now)?;
            Ok(false)
        }
        ClientEvent::NextChat => Ok(state.next_chat(session_id)),
        ClientEvent::EndChat => Ok(state.end_chat(session_id)),
        ClientEvent::GetStats => {
            state.send_stats(session_id);
            Ok(false)
        }
    }
}

/// Handles incoming client frames and routes them appropriately
pub struct MessageHandler {
    server: SharedChatServer,
    max_payload_bytes: usize,
}

impl MessageHandler {
    pub fn new(server: SharedChatServer) -> Self {
        let max_payload_bytes = server.config().max_payload_bytes;
        Self {
            server,
            max_payload_bytes,
        }
    }

    /// Process one raw text frame from a session.
    ///
    /// Decode failures are logged and dropped. Validation failures are reported to
    /// the sender as `error` events. Neither closes the connection.
    pub async fn handle_client_message(&self, session_id: &str, text: &str) {
        let event = match decode_client_event(text, self.max_payload_bytes) {
            Ok(event) => event,
            Err(ChatError::UnknownEventKind(kind)) => {
                debug!("Unknown event kind '{}' from {}", kind, session_id);
                return;
            }
            Err(e) => {
                warn!("Dropping payload from {}: {}", session_id, e);
                return;
            }
        };

        let mut state = self.server.lock().await;
        match dispatch(&mut state, session_id, event, Instant::now()) {
            Ok(true) => {
                state.broadcast_stats();
            }
            Ok(false) => {}
            Err(e) if e.is_client_facing() => state.report_error(session_id, &e),
            Err(e) => warn!("Failed to handle event from {}: {}", session_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_event() {
        let event = decode_client_event(r#"{"type":"find_match"}"#, 1024).unwrap();
        assert_eq!(event, ClientEvent::FindMatch);
    }

    #[test]
    fn test_decode_unknown_kind() {
        let err = decode_client_event(r#"{"type":"dance"}"#, 1024).unwrap_err();
        assert_eq!(err, ChatError::UnknownEventKind("dance".to_string()));
    }

    #[test]
    fn test_decode_malformed() {
        for payload in [
            "not json",
            r#"{"message":"no type"}"#,
            r#"{"type":42}"#,
            r#"{"type":"join_named_room"}"#,
            r#"{"type":"message","message":7}"#,
        ] {
            let err = decode_client_event(payload, 1024).unwrap_err();
            assert!(
                matches!(err, ChatError::MalformedPayload(_)),
                "{} should be malformed, got {:?}",
                payload,
                err
            );
        }
    }

    #[test]
    fn test_decode_rejects_oversized() {
        let payload = format!(r#"{{"type":"message","message":"{}"}}"#, "a".repeat(100));
        assert!(matches!(
            decode_client_event(&payload, 64),
            Err(ChatError::MalformedPayload(_))
        ));
    }
}
