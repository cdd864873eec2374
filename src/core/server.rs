//! Integrated chat state that coordinates sessions, matchmaking and rooms
//!
//! Everything mutable lives in [`ChatState`]. [`ChatServer`] wraps it in a single
//! async mutex so that multi-step operations (dequeue + create room + notify both
//! sides) are atomic with respect to concurrent connects and disconnects.

use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use warp::ws::Message as WsMessage;

use crate::config::ChatConfig;
use crate::constants::{PARTNER_LEFT_TEXT, WAITING_TEXT};
use crate::core::filter::ContentFilter;
use crate::core::matchmaking::MatchQueue;
use crate::core::message_types::{ServerEvent, UserStats};
use crate::core::rate_limiter::MessageRateLimiter;
use crate::core::room::RoomManager;
use crate::core::session::{Seat, SessionRegistry};
use crate::error::{ChatError, Result};

/// The single owning context for all relay state
pub struct ChatState {
    sessions: SessionRegistry,
    queue: MatchQueue,
    rooms: RoomManager,
    rate_limiter: MessageRateLimiter,
    filter: ContentFilter,
}

impl ChatState {
    pub fn new(config: &ChatConfig) -> Self {
        let filter = ContentFilter::new(&config.banned_words);
        debug!("Content filter loaded with {} banned phrases", filter.banned_words().len());
        Self {
            sessions: SessionRegistry::new(),
            queue: MatchQueue::new(),
            rooms: RoomManager::new(&config.named_rooms),
            rate_limiter: MessageRateLimiter::new(
                config.rate_limit_messages,
                config.rate_limit_window,
            ),
            filter,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    /// Register a connection and greet it with its alias, the stats and the roster
    pub fn connect(&mut self, sender: mpsc::UnboundedSender<WsMessage>) -> String {
        let (session_id, alias) = {
            let session = self.sessions.register(sender);
            (session.id.clone(), session.alias.clone())
        };
        info!("Session connected: {} ({})", alias, session_id);

        self.sessions.send_to(&session_id, &ServerEvent::Alias { alias });
        // totalUsers changed for everybody, the newcomer included
        self.broadcast_stats();
        self.send_roster(&session_id);
        session_id
    }

    /// Tear a session down: queue, private room, named room, record, rate state
    pub fn disconnect(&mut self, session_id: &str) -> bool {
        if self.sessions.lookup(session_id).is_none() {
            return false;
        }

        self.queue.remove(session_id);
        self.leave_private_room(session_id);
        self.leave_named_room(session_id);

        if let Some(session) = self.sessions.remove(session_id) {
            info!(
                "Session disconnected: {} (connected at {}, after {:?})",
                session.alias,
                session.created_at.to_rfc3339(),
                session.connection.connection_duration()
            );
        }
        self.rate_limiter.purge(session_id);
        if self.sessions.is_empty() {
            debug!("No sessions left connected");
        }

        self.broadcast_stats();
        true
    }

    /// Pair with the head of the queue, or join the queue.
    ///
    /// Returns whether any state changed. A seated session is left alone, and a
    /// session already waiting is only reminded that it is waiting.
    pub fn request_match(&mut self, session_id: &str) -> bool {
        match self.sessions.seat_of(session_id) {
            Some(Seat::Roomless) => {}
            Some(_) => {
                debug!("Ignoring match request from seated session {}", session_id);
                return false;
            }
            None => return false,
        }

        if self.queue.contains(session_id) {
            self.send_waiting(session_id);
            return false;
        }

        while let Some(partner_id) = self.queue.dequeue() {
            // Queue entries are removed on disconnect, so this only guards against bugs
            if self.sessions.lookup(&partner_id).is_none() {
                warn!("Dropping stale queue entry {}", partner_id);
                continue;
            }
            self.create_private_room(session_id, &partner_id);
            return true;
        }

        self.queue.enqueue(session_id);
        self.send_waiting(session_id);
        debug!("Session {} waiting ({} in queue)", session_id, self.queue.len());
        true
    }

    fn send_waiting(&self, session_id: &str) {
        self.sessions.send_to(
            session_id,
            &ServerEvent::Waiting {
                message: WAITING_TEXT.to_string(),
            },
        );
    }

    fn create_private_room(&mut self, requester: &str, partner: &str) {
        let room_id = self
            .rooms
            .create_private(requester.to_string(), partner.to_string());
        self.sessions.set_seat(requester, Seat::Private(room_id.clone()));
        self.sessions.set_seat(partner, Seat::Private(room_id.clone()));

        let requester_alias = self.sessions.alias_of(requester).unwrap_or_default().to_string();
        let partner_alias = self.sessions.alias_of(partner).unwrap_or_default().to_string();

        self.sessions.send_to(
            requester,
            &ServerEvent::Matched {
                room_id: room_id.clone(),
                partner_alias: partner_alias.clone(),
            },
        );
        self.sessions.send_to(
            partner,
            &ServerEvent::Matched {
                room_id: room_id.clone(),
                partner_alias: requester_alias.clone(),
            },
        );

        info!(
            "Private room created: {} between {} and {}",
            room_id, requester_alias, partner_alias
        );
    }

    /// Leave the private room (deleting it) or the waiting queue. Idempotent.
    pub fn leave_private_room(&mut self, session_id: &str) -> bool {
        if self.queue.remove(session_id) {
            debug!("Session {} left the waiting queue", session_id);
            return true;
        }

        let room_id = match self.sessions.seat_of(session_id) {
            Some(Seat::Private(room_id)) => room_id.clone(),
            _ => return false,
        };

        self.sessions.set_seat(session_id, Seat::Roomless);
        let room = match self.rooms.close_private(&room_id) {
            Some(room) => room,
            None => {
                warn!("Session {} was seated in missing private room {}", session_id, room_id);
                return true;
            }
        };
        if let Some(partner_id) = room.partner_of(session_id) {
            self.sessions.set_seat(partner_id, Seat::Roomless);
            self.sessions.send_to(
                partner_id,
                &ServerEvent::PartnerLeft {
                    message: PARTNER_LEFT_TEXT.to_string(),
                },
            );
        }

        info!(
            "Private room deleted: {} after {}s",
            room.id,
            (Utc::now() - room.created_at).num_seconds()
        );
        true
    }

    /// Seat a session in a named room, vacating whatever it held before
    pub fn join_named_room(&mut self, session_id: &str, room_id: &str) -> Result<bool> {
        let seat = self
            .sessions
            .seat_of(session_id)
            .cloned()
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))?;

        if seat == Seat::Named(room_id.to_string()) {
            // Already seated here: acknowledge again, membership unchanged
            if let Some(room) = self.rooms.named_room(room_id) {
                let ack = ServerEvent::JoinedStaticRoom {
                    room_id: room.id.clone(),
                    room_name: room.name.clone(),
                    room_users: room.member_count(),
                };
                self.sessions.send_to(session_id, &ack);
            }
            return Ok(false);
        }

        self.rooms.check_joinable(room_id)?;

        // A session may never be both queued and seated
        self.queue.remove(session_id);
        match seat {
            Seat::Private(_) => {
                self.leave_private_room(session_id);
            }
            Seat::Named(_) => {
                self.leave_named_room(session_id);
            }
            Seat::Roomless => {}
        }

        let alias = self.sessions.alias_of(session_id).unwrap_or_default().to_string();
        let (ack, joined, members) = {
            let room = self.rooms.join_named(room_id, session_id)?;
            let ack = ServerEvent::JoinedStaticRoom {
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                room_users: room.member_count(),
            };
            let joined = ServerEvent::UserJoined {
                room_id: room.id.clone(),
                alias: alias.clone(),
                room_users: room.member_count(),
            };
            (ack, joined, room.members.clone())
        };

        self.sessions.set_seat(session_id, Seat::Named(room_id.to_string()));
        self.sessions.send_to(session_id, &ack);
        let notified = self.sessions.send_to_many(&members, &joined, Some(session_id));

        info!(
            "{} joined named room {} ({} members, {} notified)",
            alias,
            room_id,
            members.len(),
            notified
        );
        Ok(true)
    }

    /// Leave the current named room. No-op unless seated in one.
    pub fn leave_named_room(&mut self, session_id: &str) -> bool {
        let room_id = match self.sessions.seat_of(session_id) {
            Some(Seat::Named(room_id)) => room_id.clone(),
            _ => return false,
        };

        self.sessions.set_seat(session_id, Seat::Roomless);
        let alias = self.sessions.alias_of(session_id).unwrap_or_default().to_string();

        let (left, remaining) = match self.rooms.leave_named(&room_id, session_id) {
            Some(room) => (
                ServerEvent::UserLeft {
                    room_id: room.id.clone(),
                    alias: alias.clone(),
                    room_users: room.member_count(),
                },
                room.members.clone(),
            ),
            None => {
                warn!("Session {} was seated in {} without membership", session_id, room_id);
                return true;
            }
        };

        self.sessions.send_to_many(&remaining, &left, Some(session_id));
        info!("{} left named room {} ({} remain)", alias, room_id, remaining.len());
        true
    }

    /// Leave whichever kind of room applies
    pub fn end_chat(&mut self, session_id: &str) -> bool {
        match self.sessions.seat_of(session_id) {
            Some(Seat::Named(_)) => self.leave_named_room(session_id),
            _ => self.leave_private_room(session_id),
        }
    }

    /// Drop the current partner (or queue slot) and look for a new one
    pub fn next_chat(&mut self, session_id: &str) -> bool {
        let left = self.leave_private_room(session_id);
        let matched = self.request_match(session_id);
        left || matched
    }

    /// Relay chat text from a seated session, after rate limiting and filtering
    pub fn route_message(&mut self, session_id: &str, text: &str, now: Instant) -> Result<()> {
        let (alias, seat) = match self.sessions.lookup(session_id) {
            Some(session) if session.is_roomless() => {
                debug!("Dropping message from roomless session {}", session_id);
                return Ok(());
            }
            Some(session) => (session.alias.clone(), session.seat.clone()),
            None => return Err(ChatError::SessionNotFound(session_id.to_string())),
        };

        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if !self.rate_limiter.admit(session_id, now) {
            warn!(
                "Rate limit exceeded for session {} ({} messages in window)",
                session_id,
                self.rate_limiter.message_count(session_id, now)
            );
            return Err(ChatError::RateLimited);
        }
        if !self.filter.passes(text) {
            warn!("Filtered message from session {}", session_id);
            return Err(ChatError::FilteredContent);
        }

        let event = ServerEvent::Message {
            alias,
            message: text.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };

        let delivered = match &seat {
            Seat::Private(room_id) => {
                let partner = self
                    .rooms
                    .private_room(room_id)
                    .and_then(|room| room.partner_of(session_id))
                    .map(str::to_string);
                match partner {
                    Some(partner) => usize::from(self.sessions.send_to(&partner, &event)),
                    None => 0,
                }
            }
            Seat::Named(room_id) => match self.rooms.named_room(room_id) {
                Some(room) => self.sessions.send_to_many(&room.members, &event, Some(session_id)),
                None => 0,
            },
            Seat::Roomless => 0,
        };

        debug!(
            "Relayed message from {} in {} to {} sessions",
            session_id,
            seat.room_id().unwrap_or("-"),
            delivered
        );
        Ok(())
    }

    /// Surface a validation failure to the originating session
    pub fn report_error(&self, session_id: &str, error: &ChatError) {
        self.sessions.send_to(
            session_id,
            &ServerEvent::Error {
                code: error.code().to_string(),
                message: error.to_string(),
            },
        );
    }

    /// Current aggregate counts
    pub fn stats(&self) -> UserStats {
        UserStats {
            active_chatters: self.rooms.seated_count(),
            waiting_users: self.queue.len(),
            total_users: self.sessions.len(),
        }
    }

    /// Push the aggregate counts to every connected session
    pub fn broadcast_stats(&self) -> usize {
        self.sessions.broadcast(&ServerEvent::UserStats(self.stats()))
    }

    /// Answer a `get_stats` request: counts plus the roster, to the caller only
    pub fn send_stats(&self, session_id: &str) {
        self.sessions
            .send_to(session_id, &ServerEvent::UserStats(self.stats()));
        self.send_roster(session_id);
    }

    pub fn send_roster(&self, session_id: &str) {
        self.sessions.send_to(
            session_id,
            &ServerEvent::StaticRooms {
                rooms: self.rooms.list_named(),
            },
        );
    }

    /// Expire rate-limit entries for sessions that have gone quiet
    pub fn cleanup_rate_limits(&mut self, now: Instant) {
        self.rate_limiter.cleanup_old_entries(now);
    }
}

/// Thread-safe wrapper serializing every operation on [`ChatState`]
pub struct ChatServer {
    state: Mutex<ChatState>,
    config: ChatConfig,
}

impl ChatServer {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            state: Mutex::new(ChatState::new(&config)),
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Exclusive access to the state for the duration of one event
    pub async fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().await
    }

    pub async fn connect(&self, sender: mpsc::UnboundedSender<WsMessage>) -> String {
        self.lock().await.connect(sender)
    }

    pub async fn disconnect(&self, session_id: &str) -> bool {
        self.lock().await.disconnect(session_id)
    }

    pub async fn stats(&self) -> UserStats {
        self.lock().await.stats()
    }

    /// Periodically expire idle rate-limit entries
    pub fn start_cleanup_task(self: Arc<Self>, period: std::time::Duration) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.lock().await.cleanup_rate_limits(Instant::now());
            }
        });
    }
}

// Shared reference to the chat server
pub type SharedChatServer = Arc<ChatServer>;

pub fn create_chat_server(config: ChatConfig) -> SharedChatServer {
    Arc::new(ChatServer::new(config))
}
