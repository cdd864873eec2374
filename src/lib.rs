//! Anon Chat - an anonymous real-time chat relay
//!
//! Clients connect over WebSocket, receive a random alias, and are either paired
//! one-to-one with another waiting client or seated in one of a fixed set of
//! named rooms.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;

// Re-export main components
pub use config::*;
pub use constants::*;
