//! Core functionality for the chat relay

pub mod connection;
pub mod filter;
pub mod matchmaking;
pub mod message_handler;
pub mod message_types;
pub mod rate_limiter;
pub mod room;
pub mod server;
pub mod session;

// Re-export main components for convenience
pub use connection::Connection;
pub use filter::ContentFilter;
pub use matchmaking::MatchQueue;
pub use message_handler::{decode_client_event, dispatch, MessageHandler};
pub use message_types::{ClientEvent, RoomInfo, ServerEvent, UserStats};
pub use rate_limiter::MessageRateLimiter;
pub use room::{NamedRoom, PrivateRoom, RoomManager};
pub use server::{create_chat_server, ChatServer, ChatState, SharedChatServer};
pub use session::{Seat, Session, SessionRegistry};
