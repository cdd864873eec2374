//! Session registry: one record per live connection

use chrono::{DateTime, Utc};
use log::debug;
use rand::Rng;
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::Message as WsMessage;

use crate::constants::{ALIAS_ADJECTIVES, ALIAS_ANIMALS, ALIAS_MAX_NUMBER};
use crate::core::connection::Connection;
use crate::core::message_types::ServerEvent;

/// Where a session is currently seated. A session holds at most one room.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Seat {
    #[default]
    Roomless,
    Private(String),
    Named(String),
}

impl Seat {
    pub fn room_id(&self) -> Option<&str> {
        match self {
            Seat::Roomless => None,
            Seat::Private(id) | Seat::Named(id) => Some(id),
        }
    }
}

/// Server-side record for one live connection
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub alias: String,
    pub seat: Seat,
    pub connection: Connection,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_roomless(&self) -> bool {
        self.seat == Seat::Roomless
    }

    /// Sessions whose socket already went away are skipped until the adapter reports it
    pub fn send(&self, event: &ServerEvent) -> bool {
        if self.connection.is_closed() {
            debug!("Skipping send to closed session {}", self.id);
            return false;
        }
        self.connection.send_event(event)
    }
}

/// Build a display alias such as `SwiftOwl42`. Not unique; routing never uses it.
pub fn generate_alias<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ALIAS_ADJECTIVES[rng.gen_range(0..ALIAS_ADJECTIVES.len())];
    let animal = ALIAS_ANIMALS[rng.gen_range(0..ALIAS_ANIMALS.len())];
    let number = rng.gen_range(1..=ALIAS_MAX_NUMBER);
    format!("{}{}{}", adjective, animal, number)
}

/// Owns every live session
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection with a fresh id and alias
    pub fn register(&mut self, sender: mpsc::UnboundedSender<WsMessage>) -> &Session {
        let id = Uuid::new_v4().to_string();
        let alias = generate_alias(&mut rand::thread_rng());
        let session = Session {
            id: id.clone(),
            alias,
            seat: Seat::Roomless,
            connection: Connection::new(id.clone(), sender),
            created_at: Utc::now(),
        };
        debug!("Registered session {} as {}", session.id, session.alias);
        self.sessions.entry(id).or_insert(session)
    }

    pub fn lookup(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Drop the record. Callers must clear room membership first.
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }

    pub fn seat_of(&self, id: &str) -> Option<&Seat> {
        self.sessions.get(id).map(|s| &s.seat)
    }

    pub fn set_seat(&mut self, id: &str, seat: Seat) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.seat = seat;
        }
    }

    pub fn alias_of(&self, id: &str) -> Option<&str> {
        self.sessions.get(id).map(|s| s.alias.as_str())
    }

    /// Send an event to one session; false if unknown or the channel is closed
    pub fn send_to(&self, id: &str, event: &ServerEvent) -> bool {
        self.sessions.get(id).map(|s| s.send(event)).unwrap_or(false)
    }

    /// Send an event to each listed session, skipping `exclude`
    pub fn send_to_many<'a, I>(&self, ids: I, event: &ServerEvent, exclude: Option<&str>) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        ids.into_iter()
            .filter(|id| Some(id.as_str()) != exclude)
            .filter(|id| self.send_to(id, event))
            .count()
    }

    /// Send an event to every connected session
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        self.sessions.values().filter(|s| s.send(event)).count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_alias_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let alias = generate_alias(&mut rng);
            let adjective = ALIAS_ADJECTIVES.iter().find(|a| alias.starts_with(*a)).unwrap();
            let rest = &alias[adjective.len()..];
            let animal = ALIAS_ANIMALS.iter().find(|a| rest.starts_with(*a)).unwrap();
            let number: u32 = rest[animal.len()..].parse().unwrap();
            assert!((1..=ALIAS_MAX_NUMBER).contains(&number));
        }
    }

    #[test]
    fn test_register_lookup_remove() {
        let mut registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = registry.register(tx.clone()).id.clone();
        let other = registry.register(tx).id.clone();
        assert_ne!(id, other);
        assert_eq!(registry.len(), 2);

        let session = registry.lookup(&id).unwrap();
        assert!(session.is_roomless());

        registry.set_seat(&id, Seat::Named("general".to_string()));
        assert_eq!(registry.seat_of(&id).unwrap().room_id(), Some("general"));

        assert!(registry.remove(&id).is_some());
        assert!(registry.lookup(&id).is_none());
        assert!(!registry.send_to(&id, &ServerEvent::Waiting { message: "x".into() }));
    }
}
