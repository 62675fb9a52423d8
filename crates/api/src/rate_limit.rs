//! In-memory sliding-window rate limiter.
//!
//! Guards the forgot-password endpoint (3 requests per minute per key).
//! State lives in-process only; a restart clears it, which is acceptable
//! for an abuse brake on a single-node deployment.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Configuration for a rate limiter window.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed inside the window.
    pub max_attempts: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::from_secs(60),
        }
    }
}

/// Per-key attempt bookkeeping.
#[derive(Debug)]
struct Entry {
    attempts: u32,
    window_start: Instant,
}

/// Sliding-window rate limiter keyed by an arbitrary string (here: the
/// requesting email address).
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it is allowed.
    pub async fn check(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(Entry {
            attempts: 0,
            window_start: now,
        });

        // Window expired: start a fresh one.
        if now.duration_since(entry.window_start) >= self.config.window {
            entry.attempts = 0;
            entry.window_start = now;
        }

        if entry.attempts >= self.config.max_attempts {
            return false;
        }

        entry.attempts += 1;
        true
    }
}
