/// Configuration management
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How long an admin session stays valid after issue
    pub admin_session_max_age: Duration,

    /// Capacity of the per-session chat event broadcast channel
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_session_max_age: Duration::from_secs(24 * 60 * 60),
            event_buffer: 64,
        }
    }
}
