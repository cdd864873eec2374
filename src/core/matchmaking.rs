//! FIFO queue of sessions waiting for a one-to-one partner

use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<String>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail. Returns false if the session is already queued.
    pub fn enqueue(&mut self, session_id: &str) -> bool {
        if self.contains(session_id) {
            return false;
        }
        self.waiting.push_back(session_id.to_string());
        true
    }

    /// Take the longest-waiting session
    pub fn dequeue(&mut self) -> Option<String> {
        self.waiting.pop_front()
    }

    /// Remove a session wherever it sits. Returns whether it was queued.
    pub fn remove(&mut self, session_id: &str) -> bool {
        match self.waiting.iter().position(|id| id == session_id) {
            Some(index) => {
                self.waiting.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.waiting.iter().any(|id| id == session_id)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
