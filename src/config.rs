//! Server configuration module
//! Handles runtime parameters for the chat relay

use crate::constants::{
    DEFAULT_BANNED_WORDS, DEFAULT_HOST, DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_NAMED_ROOMS,
    DEFAULT_PORT, DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW_MS,
};
use crate::error::{ChatError, Result};
use std::env;
use std::time::Duration;

/// Static definition of a named room, loaded once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRoomSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub capacity: usize,
}

/// Chat relay configuration parameters
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub host: String,
    pub port: u16,
    /// Messages admitted per session inside one rate window
    pub rate_limit_messages: usize,
    /// Length of the sliding rate window
    pub rate_limit_window: Duration,
    /// Deny-list for the content filter (matched case-insensitively)
    pub banned_words: Vec<String>,
    /// Inbound frames above this size are dropped
    pub max_payload_bytes: usize,
    pub named_rooms: Vec<NamedRoomSpec>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_limit_messages: DEFAULT_RATE_LIMIT,
            rate_limit_window: Duration::from_millis(DEFAULT_RATE_WINDOW_MS),
            banned_words: DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            named_rooms: default_named_rooms(),
        }
    }
}

/// The fixed named-room roster
pub fn default_named_rooms() -> Vec<NamedRoomSpec> {
    DEFAULT_NAMED_ROOMS
        .iter()
        .map(|(id, name, description, capacity)| NamedRoomSpec {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            capacity: *capacity,
        })
        .collect()
}

fn parse_banned_words(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

impl ChatConfig {
    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        let host = env::var("ANON_CHAT_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = env::var("ANON_CHAT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let rate_limit_messages = env::var("ANON_CHAT_RATE_LIMIT")
            .ok()
            .and_then(|r| r.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);

        let window_ms = env::var("ANON_CHAT_RATE_WINDOW_MS")
            .ok()
            .and_then(|w| w.parse().ok())
            .unwrap_or(DEFAULT_RATE_WINDOW_MS);

        let banned_words = env::var("ANON_CHAT_BANNED_WORDS")
            .map(|raw| parse_banned_words(&raw))
            .unwrap_or_else(|_| DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect());

        let max_payload_bytes = env::var("ANON_CHAT_MAX_PAYLOAD")
            .ok()
            .and_then(|m| m.parse().ok())
            .unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES);

        let config = Self {
            host,
            port,
            rate_limit_messages,
            rate_limit_window: Duration::from_millis(window_ms),
            banned_words,
            max_payload_bytes,
            named_rooms: default_named_rooms(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the relay unusable
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_messages == 0 {
            return Err(ChatError::ConfigError(
                "ANON_CHAT_RATE_LIMIT must be at least 1".to_string(),
            ));
        }
        if self.rate_limit_window.is_zero() {
            return Err(ChatError::ConfigError(
                "ANON_CHAT_RATE_WINDOW_MS must be greater than zero".to_string(),
            ));
        }
        if self.max_payload_bytes == 0 {
            return Err(ChatError::ConfigError(
                "ANON_CHAT_MAX_PAYLOAD must be greater than zero".to_string(),
            ));
        }
        for room in &self.named_rooms {
            if room.capacity == 0 {
                return Err(ChatError::ConfigError(format!(
                    "Named room '{}' has zero capacity",
                    room.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_contains_general() {
        let config = ChatConfig::default();
        let general = config.named_rooms.iter().find(|r| r.id == "general").unwrap();
        assert_eq!(general.capacity, 50);
        assert_eq!(config.rate_limit_messages, 10);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_banned_words() {
        let words = parse_banned_words(" Spam, ,SCAM ,troll");
        assert_eq!(words, vec!["spam", "scam", "troll"]);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = ChatConfig {
            rate_limit_messages: 0,
            ..ChatConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ANON_CHAT_RATE_LIMIT"));
    }
}
