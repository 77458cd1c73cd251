//! Logging utility (C10)
//!
//! Tracks each session's `logging/setLevel` threshold and decides whether a
//! given [`LogLevel`] message is admitted for that session, per §4.10: a
//! message is sent when `message.severity() <= threshold.severity()`
//! (lower numeric value is more severe, so this reads as "at least as
//! severe as the threshold").
//!
//! This is distinct from the crate's own `tracing` diagnostics — this
//! registry governs the wire-level `notifications/message` feed a server
//! emits to clients, not process-local logs.

use std::sync::Arc;

use dashmap::DashMap;

use crate::protocol::types::LogLevel;

/// Per-session log-level thresholds. Sessions default to [`LogLevel::Error`]
/// (§4.10) until a client sends `logging/setLevel`.
#[derive(Clone, Default)]
pub struct LoggingRegistry {
    thresholds: Arc<DashMap<String, LogLevel>>,
}

impl LoggingRegistry {
    pub fn new() -> Self {
        Self {
            thresholds: Arc::new(DashMap::new()),
        }
    }

    /// Set `session_id`'s threshold, as requested by `logging/setLevel`.
    pub fn set_level(&self, session_id: &str, level: LogLevel) {
        self.thresholds.insert(session_id.to_string(), level);
    }

    /// Current threshold for `session_id`, or the §4.10 default.
    pub fn level_of(&self, session_id: &str) -> LogLevel {
        self.thresholds
            .get(session_id)
            .map(|l| *l.value())
            .unwrap_or_default()
    }

    /// Whether a message at `level` should be delivered to `session_id`.
    pub fn admits(&self, session_id: &str, level: LogLevel) -> bool {
        level.severity() <= self.level_of(session_id).severity()
    }

    /// Drop a session's threshold (e.g. on disconnect).
    pub fn remove(&self, session_id: &str) {
        self.thresholds.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_error_threshold() {
        let registry = LoggingRegistry::new();
        assert_eq!(registry.level_of("s1"), LogLevel::Error);
        assert!(registry.admits("s1", LogLevel::Emergency));
        assert!(registry.admits("s1", LogLevel::Error));
        assert!(!registry.admits("s1", LogLevel::Info));
    }

    #[test]
    fn set_level_widens_admission() {
        let registry = LoggingRegistry::new();
        registry.set_level("s1", LogLevel::Debug);
        assert!(registry.admits("s1", LogLevel::Debug));
        assert!(registry.admits("s1", LogLevel::Info));
    }

    #[test]
    fn sessions_are_independent() {
        let registry = LoggingRegistry::new();
        registry.set_level("s1", LogLevel::Debug);
        assert!(!registry.admits("s2", LogLevel::Info));
    }

    #[test]
    fn remove_resets_to_default() {
        let registry = LoggingRegistry::new();
        registry.set_level("s1", LogLevel::Debug);
        registry.remove("s1");
        assert_eq!(registry.level_of("s1"), LogLevel::Error);
    }
}
