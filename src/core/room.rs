use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::NamedRoomSpec;
use crate::core::message_types::RoomInfo;
use crate::error::{ChatError, Result};

/// Ephemeral one-to-one room created by matchmaking
#[derive(Debug, Clone)]
pub struct PrivateRoom {
    pub id: String,
    /// Both participants, in match order (requester first)
    pub members: [String; 2],
    pub created_at: DateTime<Utc>,
}

impl PrivateRoom {
    pub fn new(first: String, second: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            members: [first, second],
            created_at: Utc::now(),
        }
    }

    /// The member that is not `session_id`
    pub fn partner_of(&self, session_id: &str) -> Option<&str> {
        match &self.members {
            [a, b] if a == session_id => Some(b.as_str()),
            [a, b] if b == session_id => Some(a.as_str()),
            _ => None,
        }
    }

    pub fn has_member(&self, session_id: &str) -> bool {
        self.members.iter().any(|m| m == session_id)
    }
}

/// Persistent capacity-bounded room from the startup roster
#[derive(Debug, Clone)]
pub struct NamedRoom {
    pub id: String,
    pub name: String,
    pub description: String,
    pub capacity: usize,
    /// Member session ids in join order
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NamedRoom {
    pub fn from_spec(spec: &NamedRoomSpec, created_at: DateTime<Utc>) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            description: spec.description.clone(),
            capacity: spec.capacity,
            members: Vec::new(),
            created_at,
        }
    }

    /// Adds a member, refusing once the room is at capacity
    pub fn add_member(&mut self, session_id: String) -> Result<()> {
        if self.is_full() {
            return Err(ChatError::RoomFull(self.id.clone()));
        }
        if !self.has_member(&session_id) {
            self.members.push(session_id);
        }
        Ok(())
    }

    /// Removes a member, keeping the order of the others
    pub fn remove_member(&mut self, session_id: &str) -> bool {
        match self.members.iter().position(|m| m == session_id) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_member(&self, session_id: &str) -> bool {
        self.members.iter().any(|m| m == session_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            current_users: self.member_count(),
            max_users: self.capacity,
        }
    }
}

/// Owns both kinds of room. Holds session ids only; seats live on the sessions.
#[derive(Debug)]
pub struct RoomManager {
    private_rooms: HashMap<String, PrivateRoom>,
    /// Fixed roster, in display order
    named_rooms: Vec<NamedRoom>,
}

impl RoomManager {
    /// Build the manager with the named-room roster established at startup
    pub fn new(roster: &[NamedRoomSpec]) -> Self {
        let started_at = Utc::now();
        Self {
            private_rooms: HashMap::new(),
            named_rooms: roster
                .iter()
                .map(|spec| NamedRoom::from_spec(spec, started_at))
                .collect(),
        }
    }

    /// Create a private room for a freshly matched pair and return its id
    pub fn create_private(&mut self, first: String, second: String) -> String {
        let room = PrivateRoom::new(first, second);
        let room_id = room.id.clone();
        self.private_rooms.insert(room_id.clone(), room);
        room_id
    }

    pub fn private_room(&self, room_id: &str) -> Option<&PrivateRoom> {
        self.private_rooms.get(room_id)
    }

    /// Delete a private room. Rooms are never reused.
    pub fn close_private(&mut self, room_id: &str) -> Option<PrivateRoom> {
        self.private_rooms.remove(room_id)
    }

    pub fn private_room_count(&self) -> usize {
        self.private_rooms.len()
    }

    pub fn named_room(&self, room_id: &str) -> Option<&NamedRoom> {
        self.named_rooms.iter().find(|r| r.id == room_id)
    }

    /// Fails with `RoomNotFound` or `RoomFull` before touching any state
    pub fn check_joinable(&self, room_id: &str) -> Result<&NamedRoom> {
        let room = self
            .named_room(room_id)
            .ok_or_else(|| ChatError::RoomNotFound(room_id.to_string()))?;
        if room.is_full() {
            return Err(ChatError::RoomFull(room_id.to_string()));
        }
        Ok(room)
    }

    /// Seat a session in a named room
    pub fn join_named(&mut self, room_id: &str, session_id: &str) -> Result<&NamedRoom> {
        let room = self
            .named_rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| ChatError::RoomNotFound(room_id.to_string()))?;
        room.add_member(session_id.to_string())?;
        Ok(room)
    }

    /// Remove a session from a named room; returns the room if it was a member
    pub fn leave_named(&mut self, room_id: &str, session_id: &str) -> Option<&NamedRoom> {
        let room = self.named_rooms.iter_mut().find(|r| r.id == room_id)?;
        if room.remove_member(session_id) {
            Some(room)
        } else {
            None
        }
    }

    /// Roster with live member counts
    pub fn list_named(&self) -> Vec<RoomInfo> {
        self.named_rooms.iter().map(NamedRoom::info).collect()
    }

    /// Sessions seated anywhere: two per private room plus named-room members
    pub fn seated_count(&self) -> usize {
        self.private_rooms.len() * 2 + self.named_rooms.iter().map(|r| r.member_count()).sum::<usize>()
    }
}
