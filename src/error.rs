use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    // Session errors
    SessionNotFound(String),

    // Room errors
    RoomNotFound(String),
    RoomFull(String),

    // Moderation errors
    RateLimited,
    FilteredContent,

    // Inbound payload errors (logged, never sent to the client)
    MalformedPayload(String),
    UnknownEventKind(String),

    // Configuration errors
    ConfigError(String),
}

impl ChatError {
    /// Whether the originating session is told about this error
    pub fn is_client_facing(&self) -> bool {
        matches!(
            self,
            Self::RoomNotFound(_) | Self::RoomFull(_) | Self::RateLimited | Self::FilteredContent
        )
    }

    /// Stable machine-readable code used in outbound `error` events
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::RoomNotFound(_) => "room_not_found",
            Self::RoomFull(_) => "room_full",
            Self::RateLimited => "rate_limited",
            Self::FilteredContent => "filtered_content",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::UnknownEventKind(_) => "unknown_event_kind",
            Self::ConfigError(_) => "config_error",
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            Self::RoomNotFound(id) => write!(f, "Room not found: {}", id),
            Self::RoomFull(id) => write!(f, "Room is full: {}", id),
            Self::RateLimited => {
                write!(f, "Rate limit exceeded. Please wait before sending more messages.")
            }
            Self::FilteredContent => write!(f, "Message contains inappropriate content."),
            Self::MalformedPayload(msg) => write!(f, "Malformed payload: {}", msg),
            Self::UnknownEventKind(kind) => write!(f, "Unknown event kind: {}", kind),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ChatError {}

// Generic result type for the chat relay
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_facing_split() {
        assert!(ChatError::RateLimited.is_client_facing());
        assert!(ChatError::RoomFull("general".into()).is_client_facing());
        assert!(!ChatError::MalformedPayload("eof".into()).is_client_facing());
        assert!(!ChatError::UnknownEventKind("dance".into()).is_client_facing());
    }

    #[test]
    fn test_messages_mention_cause() {
        assert!(ChatError::RateLimited.to_string().contains("Rate limit exceeded"));
        assert!(ChatError::FilteredContent.to_string().contains("inappropriate content"));
        assert_eq!(ChatError::RoomFull("x".into()).code(), "room_full");
    }
}
