//! Per-session sliding-window message rate limiting

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::constants::{DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW_MS};

/// Sliding-window counter keyed by session id.
///
/// Every check drops timestamps that fell out of the window and counts the rest,
/// so admission is exact rather than bucketed.
#[derive(Debug)]
pub struct MessageRateLimiter {
    session_message_times: HashMap<String, Vec<Instant>>,
    max_messages: usize,
    window_duration: Duration,
}

impl Default for MessageRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT, Duration::from_millis(DEFAULT_RATE_WINDOW_MS))
    }
}

impl MessageRateLimiter {
    pub fn new(max_messages: usize, window_duration: Duration) -> Self {
        Self {
            session_message_times: HashMap::new(),
            max_messages,
            window_duration,
        }
    }

    /// Check if a session may send another message at `now`, recording it if so
    pub fn admit(&mut self, session_id: &str, now: Instant) -> bool {
        let window = self.window_duration;
        let times = self
            .session_message_times
            .entry(session_id.to_string())
            .or_default();

        // Remove old messages outside the window
        times.retain(|&time| now.saturating_duration_since(time) < window);

        if times.len() < self.max_messages {
            times.push(now);
            true
        } else {
            false
        }
    }

    /// Current message count for a session in the window ending at `now`
    pub fn message_count(&self, session_id: &str, now: Instant) -> usize {
        self.session_message_times
            .get(session_id)
            .map(|times| {
                times
                    .iter()
                    .filter(|&&time| now.saturating_duration_since(time) < self.window_duration)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Forget everything about a session (on disconnect)
    pub fn purge(&mut self, session_id: &str) {
        self.session_message_times.remove(session_id);
    }

    /// Drop expired timestamps and sessions with nothing left
    pub fn cleanup_old_entries(&mut self, now: Instant) {
        let window = self.window_duration;
        self.session_message_times.retain(|_, times| {
            times.retain(|&time| now.saturating_duration_since(time) < window);
            !times.is_empty()
        });
    }

    pub fn tracked_sessions(&self) -> usize {
        self.session_message_times.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleventh_message_in_window_rejected() {
        let mut limiter = MessageRateLimiter::default();
        let start = Instant::now();

        for i in 0..10 {
            assert!(limiter.admit("s1", start + Duration::from_millis(i * 100)));
        }
        assert!(!limiter.admit("s1", start + Duration::from_millis(1_500)));
        assert_eq!(limiter.message_count("s1", start + Duration::from_millis(1_500)), 10);
    }

    #[test]
    fn test_admission_resumes_after_window() {
        let mut limiter = MessageRateLimiter::default();
        let start = Instant::now();

        for _ in 0..10 {
            assert!(limiter.admit("s1", start));
        }
        assert!(!limiter.admit("s1", start + Duration::from_millis(59_999)));
        assert!(limiter.admit("s1", start + Duration::from_millis(60_000)));
    }

    #[test]
    fn test_window_slides_per_message() {
        let mut limiter = MessageRateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.admit("s1", start));
        assert!(limiter.admit("s1", start + Duration::from_secs(5)));
        assert!(!limiter.admit("s1", start + Duration::from_secs(9)));
        // Only the first timestamp has expired
        assert!(limiter.admit("s1", start + Duration::from_secs(10)));
        assert!(!limiter.admit("s1", start + Duration::from_secs(12)));
    }

    #[test]
    fn test_sessions_are_independent_and_purgeable() {
        let mut limiter = MessageRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.admit("a", now));
        assert!(limiter.admit("b", now));
        assert!(!limiter.admit("a", now));

        limiter.purge("a");
        assert_eq!(limiter.message_count("a", now), 0);
        assert!(limiter.admit("a", now));
    }

    #[test]
    fn test_cleanup_drops_idle_sessions() {
        let mut limiter = MessageRateLimiter::new(5, Duration::from_secs(1));
        let now = Instant::now();
        limiter.admit("a", now);
        limiter.admit("b", now + Duration::from_millis(900));

        limiter.cleanup_old_entries(now + Duration::from_millis(1_200));
        assert_eq!(limiter.tracked_sessions(), 1);
    }
}
