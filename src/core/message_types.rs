//! Typed events exchanged with clients

use serde::{Deserialize, Serialize};

/// Client-to-server events
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Ask to be paired with a random partner
    #[serde(rename = "find_match")]
    FindMatch,

    /// Join one of the named rooms
    #[serde(rename = "join_named_room", alias = "join_static_room")]
    JoinNamedRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },

    /// Leave the current named room
    #[serde(rename = "leave_named_room", alias = "leave_static_room")]
    LeaveNamedRoom,

    /// Chat text for the current room
    #[serde(rename = "message")]
    Message { message: String },

    /// Drop the current partner and look for a new one
    #[serde(rename = "next_chat")]
    NextChat,

    /// Leave whatever room the session is in
    #[serde(rename = "end_chat")]
    EndChat,

    /// Request aggregate statistics and the room roster
    #[serde(rename = "get_stats")]
    GetStats,
}

impl ClientEvent {
    /// Every `type` value a client may send, aliases included
    pub const KINDS: &'static [&'static str] = &[
        "find_match",
        "join_named_room",
        "join_static_room",
        "leave_named_room",
        "leave_static_room",
        "message",
        "next_chat",
        "end_chat",
        "get_stats",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FindMatch => "find_match",
            Self::JoinNamedRoom { .. } => "join_named_room",
            Self::LeaveNamedRoom => "leave_named_room",
            Self::Message { .. } => "message",
            Self::NextChat => "next_chat",
            Self::EndChat => "end_chat",
            Self::GetStats => "get_stats",
        }
    }
}

/// Server-to-client events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Pseudonym assigned on connect
    Alias { alias: String },

    /// Queued for matchmaking
    Waiting { message: String },

    /// Paired with a partner in a private room
    #[serde(rename_all = "camelCase")]
    Matched { room_id: String, partner_alias: String },

    /// Seated in a named room
    #[serde(rename_all = "camelCase")]
    JoinedStaticRoom {
        room_id: String,
        room_name: String,
        room_users: usize,
    },

    /// Another session joined the caller's named room
    #[serde(rename_all = "camelCase")]
    UserJoined {
        room_id: String,
        alias: String,
        room_users: usize,
    },

    /// Another session left the caller's named room
    #[serde(rename_all = "camelCase")]
    UserLeft {
        room_id: String,
        alias: String,
        room_users: usize,
    },

    /// Chat text relayed from another session
    Message {
        alias: String,
        message: String,
        timestamp: i64,
    },

    /// The private-room partner went away
    PartnerLeft { message: String },

    /// Aggregate counts, pushed to every session on change
    UserStats(UserStats),

    /// Named-room roster with live member counts
    StaticRooms { rooms: Vec<RoomInfo> },

    /// Validation failure surfaced to the sender
    Error { code: String, message: String },
}

/// Aggregate counts across the whole relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Sessions currently seated in a private or named room
    pub active_chatters: usize,
    /// Sessions in the matchmaking queue
    pub waiting_users: usize,
    /// All connected sessions
    pub total_users: usize,
}

/// Named room information for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub current_users: usize,
    pub max_users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_client_event_decoding() {
        let join: ClientEvent =
            serde_json::from_str(r#"{"type":"join_static_room","roomId":"general"}"#).unwrap();
        assert_eq!(
            join,
            ClientEvent::JoinNamedRoom {
                room_id: "general".to_string()
            }
        );

        let msg: ClientEvent = serde_json::from_str(r#"{"type":"message","message":"hi"}"#).unwrap();
        assert_eq!(msg.kind(), "message");

        let leave: ClientEvent = serde_json::from_str(r#"{"type":"leave_named_room"}"#).unwrap();
        assert_eq!(leave, ClientEvent::LeaveNamedRoom);
    }

    #[test]
    fn test_every_listed_kind_decodes() {
        for kind in ClientEvent::KINDS {
            let payload = json!({"type": kind, "roomId": "general", "message": "hi"});
            let event: ClientEvent = serde_json::from_value(payload)
                .unwrap_or_else(|e| panic!("{} failed to decode: {}", kind, e));
            // Aliases decode to the canonical variant
            assert_eq!(event.kind(), kind.replace("static_room", "named_room"));
        }
    }

    #[test]
    fn test_server_event_wire_shape() {
        let matched = ServerEvent::Matched {
            room_id: "r1".to_string(),
            partner_alias: "BraveOwl7".to_string(),
        };
        let value = serde_json::to_value(&matched).unwrap();
        assert_eq!(
            value,
            json!({"type": "matched", "roomId": "r1", "partnerAlias": "BraveOwl7"})
        );

        let stats = ServerEvent::UserStats(UserStats {
            active_chatters: 2,
            waiting_users: 1,
            total_users: 3,
        });
        let value: Value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["type"], "user_stats");
        assert_eq!(value["activeChatters"], 2);
        assert_eq!(value["waitingUsers"], 1);
        assert_eq!(value["totalUsers"], 3);

        let joined = ServerEvent::JoinedStaticRoom {
            room_id: "general".to_string(),
            room_name: "General Chat".to_string(),
            room_users: 1,
        };
        let value = serde_json::to_value(&joined).unwrap();
        assert_eq!(value["type"], "joined_static_room");
        assert_eq!(value["roomUsers"], 1);
    }
}
